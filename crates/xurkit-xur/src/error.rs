//! Error types for XUR reading and writing.

use thiserror::Error;

/// Errors that can occur while reading or writing XUR files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Primitive decoding error.
    #[error("{0}")]
    Common(#[from] xurkit_common::Error),

    /// Schema lookup error.
    #[error("schema error: {0}")]
    Schema(#[from] xurkit_schema::Error),

    /// Value does not fit its definition.
    #[error("value error: {0}")]
    Value(#[from] xurkit_model::Error),

    /// File does not start with `XUIB`.
    #[error("invalid XUR magic: {0:?}")]
    InvalidMagic([u8; 4]),

    /// Wire version other than 5 or 8.
    #[error("unsupported XUR version {0}")]
    UnsupportedVersion(u32),

    /// Header file size disagrees with the stream length.
    #[error("file size mismatch: header says {header} bytes, stream has {actual}")]
    FileSizeMismatch { header: u32, actual: usize },

    /// Section table entry reaching past the end of the file.
    #[error("section {magic} at {offset:#x}+{length:#x} exceeds file size {file_size:#x}")]
    SectionOutOfBounds {
        magic: String,
        offset: u32,
        length: u32,
        file_size: usize,
    },

    /// Section magic not known for the file's version.
    #[error("unexpected section {magic} in version {version} file")]
    UnexpectedSection { magic: String, version: u32 },

    /// Section listed more than once.
    #[error("duplicate section {0}")]
    DuplicateSection(String),

    /// Pool section listed after the object tree that references it.
    #[error("section {0} follows DATA")]
    SectionAfterData(String),

    /// Required section absent.
    #[error("missing section {0}")]
    MissingSection(&'static str),

    /// Reading a section ended somewhere other than its declared end.
    #[error("section {magic} desync: ended at {actual:#x}, expected {expected:#x}")]
    SectionDesync {
        magic: String,
        expected: usize,
        actual: usize,
    },

    /// Stored structural count disagrees with the decoded tree.
    #[error("count header mismatch for {field}: stored {stored}, computed {computed}")]
    CountMismatch {
        field: &'static str,
        stored: u32,
        computed: u32,
    },

    /// Pool reference past the end of its pool.
    #[error("{pool} reference {index} out of range (pool holds {len})")]
    PoolIndex {
        pool: &'static str,
        index: u32,
        len: usize,
    },

    /// Property address not declared by the object's class hierarchy.
    #[error("class '{class}' has no property at depth {depth}, index {index}")]
    UnresolvedProperty {
        class: String,
        depth: u32,
        index: u32,
    },

    /// Property whose definition is not part of the object's class hierarchy.
    #[error("property '{property}' is not declared by the hierarchy of '{class}'")]
    ForeignProperty { class: String, property: String },

    /// Timeline naming a child that does not exist.
    #[error("timeline target '{0}' is not a child of the animated object")]
    UnknownTimelineTarget(String),

    /// Object tree nested past the supported depth.
    #[error("object tree nested deeper than {0} levels")]
    NestingTooDeep(usize),

    /// Root object is not a canvas.
    #[error("root object must be XuiCanvas, found '{0}'")]
    InvalidRoot(String),

    /// Value that has no encoding at its position.
    #[error("{0}")]
    InvalidValue(String),

    /// Assembled output length disagrees with the computed layout.
    #[error("output size mismatch: expected {expected} bytes, wrote {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Field too large for its on-disk width.
    #[error("{0} does not fit in the XUR format")]
    Overflow(&'static str),
}

/// Result type for XUR operations.
pub type Result<T> = std::result::Result<T, Error>;
