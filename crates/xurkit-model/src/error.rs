//! Error types for building and validating object trees.

use thiserror::Error;
use xurkit_schema::PropertyType;

/// Errors raised when a value does not fit its property definition.
#[derive(Debug, Error)]
pub enum Error {
    /// Value variant does not match the declared type.
    #[error("property '{property}' expects a {expected} value, got {found}")]
    TypeMismatch {
        property: String,
        expected: PropertyType,
        found: &'static str,
    },

    /// Indexed definition given a single value, or the other way round.
    #[error("value shape of property '{property}' does not match its indexed flag ({indexed})")]
    IndexMismatch { property: String, indexed: bool },

    /// Indexed property without any stops.
    #[error("indexed property '{0}' has no values")]
    EmptyIndexed(String),

    /// Compound member whose definition is not declared by the object property.
    #[error("'{member}' is not a member of object property '{property}'")]
    ForeignMember { property: String, member: String },

    /// Text that cannot be decoded as the declared type.
    #[error("invalid {expected} text '{text}' for property '{property}'")]
    InvalidText {
        property: String,
        expected: PropertyType,
        text: String,
    },

    /// Property cannot appear in a keyframe.
    #[error("property '{0}' cannot be animated")]
    NotAnimatable(String),

    /// Keyframe property that does not form a single-member chain down to a leaf.
    #[error("keyframe property '{0}' does not address a single leaf value")]
    InvalidAnimationPath(String),

    /// Keyframes of one timeline animate different property lists.
    #[error("keyframes of timeline '{0}' animate different properties")]
    InconsistentTimeline(String),

    /// GoTo-family named frame without a target.
    #[error("named frame '{0}' needs a target frame name")]
    MissingCommandTarget(String),

    /// Named-frame command not recognised.
    #[error("unknown named-frame command '{0}'")]
    UnknownCommand(String),

    /// Interpolation kind not recognised.
    #[error("unknown interpolation '{0}'")]
    UnknownInterpolation(String),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, Error>;
