//! Error types for xurkit-common.

use thiserror::Error;

/// Common error type for xurkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// UTF-16 decoding error.
    #[error("UTF-16 error: {0}")]
    Utf16(#[from] std::char::DecodeUtf16Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Missing null terminator in string.
    #[error("string missing null terminator")]
    MissingNullTerminator,

    /// String to be null-terminated already contains a NUL byte.
    #[error("string contains an interior NUL byte")]
    InteriorNul,

    /// Byte outside the ASCII range in a fixed-length ASCII field.
    #[error("non-ASCII byte {0:#04x} in ASCII field")]
    NonAscii(u8),

    /// String longer than its fixed-length field.
    #[error("string of {len} bytes does not fit a {capacity}-byte field")]
    FieldOverflow { len: usize, capacity: usize },

    /// String too long for its length prefix.
    #[error("string of {0} UTF-16 units exceeds the 65535 unit limit")]
    StringTooLong(usize),

    /// XML parsing error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
