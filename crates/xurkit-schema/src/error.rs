//! Error types for schema loading and lookup.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when registering or querying schemas.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (XML parsing).
    #[error("{0}")]
    Common(#[from] xurkit_common::Error),

    /// Schema file structure is invalid.
    #[error("malformed schema {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Class declared twice in one group.
    #[error("duplicate class '{0}'")]
    DuplicateClass(String),

    /// Property name declared twice in one class.
    #[error("duplicate property '{property}' in class '{class}'")]
    DuplicateProperty { class: String, property: String },

    /// Property id used twice in one class or along its hierarchy.
    #[error("duplicate property id {id} in hierarchy of class '{class}'")]
    DuplicatePropertyId { class: String, id: u32 },

    /// Ignore entry listed twice.
    #[error("duplicate ignore entry {class}.{property}")]
    DuplicateIgnore { class: String, property: String },

    /// Ignore entry naming something the group does not declare.
    #[error("ignore entry {class}.{property} names an undeclared class or property")]
    UnknownIgnoreTarget { class: String, property: String },

    /// Unknown property type name.
    #[error("unknown property type '{0}'")]
    UnknownType(String),

    /// Unknown property flag name.
    #[error("unknown property flag '{0}'")]
    UnknownFlag(String),

    /// Class not found in the group.
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// Base-class link cannot be resolved (usually a missing custom class).
    #[error("class '{class}' derives from unknown class '{base}'")]
    MissingBaseClass { class: String, base: String },

    /// Base-class links form a cycle.
    #[error("class hierarchy of '{0}' contains a cycle")]
    HierarchyCycle(String),
}

impl Error {
    /// Build a [`Error::Malformed`] for `path`.
    pub(crate) fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, Error>;
