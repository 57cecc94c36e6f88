//! Error types for conversion.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while detecting or converting documents.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema registry error.
    #[error("schema error: {0}")]
    Schema(#[from] xurkit_schema::Error),

    /// XUI codec error.
    #[error("XUI error: {0}")]
    Xui(#[from] xurkit_xui::Error),

    /// XUR codec error.
    #[error("XUR error: {0}")]
    Xur(#[from] xurkit_xur::Error),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Batch output path already claimed by another input file.
    #[error("output {} is already written by another input", .0.display())]
    OutputCollision(PathBuf),

    /// Neither a XUR signature nor anything that looks like XML.
    #[error("unrecognised file format: {}", .0.display())]
    UnknownFormat(PathBuf),

    /// Format name that does not name a supported format.
    #[error("unknown format '{0}', expected xui, xur5 or xur8")]
    UnknownFormatName(String),
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
