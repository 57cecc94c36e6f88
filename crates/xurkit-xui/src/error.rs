//! Error types for XUI reading and writing.

use thiserror::Error;

/// Errors that can occur while reading or writing XUI documents.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error.
    #[error("{0}")]
    Common(#[from] xurkit_common::Error),

    /// XML writing error.
    #[error("XML error: {0}")]
    Xml(String),

    /// Schema lookup error.
    #[error("schema error: {0}")]
    Schema(#[from] xurkit_schema::Error),

    /// Value does not fit its definition.
    #[error("value error: {0}")]
    Value(#[from] xurkit_model::Error),

    /// Element name that is not a class of the schema group.
    #[error("unknown class '{0}'")]
    UnknownClass(String),

    /// Property name not found along the class hierarchy.
    #[error("class '{class}' has no property '{property}'")]
    UnknownProperty { class: String, property: String },

    /// Object elements nested past the supported depth.
    #[error("object tree nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Root object is not a canvas.
    #[error("root element must be XuiCanvas, found '{0}'")]
    InvalidRoot(String),

    /// Required child element is absent.
    #[error("<{parent}> is missing <{element}>")]
    MissingElement { parent: String, element: String },

    /// Numeric element or attribute that does not parse.
    #[error("invalid number '{text}' in <{element}>")]
    InvalidNumber { element: String, text: String },

    /// Timeline naming a child that does not exist.
    #[error("timeline target '{0}' is not a child of the animated object")]
    UnknownTimelineTarget(String),

    /// Keyframe with a different number of values than the timeline has paths.
    #[error("keyframe of timeline '{target}' has {found} values for {expected} properties")]
    KeyframeValueCount {
        target: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for XUI operations.
pub type Result<T> = std::result::Result<T, Error>;
