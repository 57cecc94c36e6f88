//! xurkit - XUI and XUR UI resource conversion library.
//!
//! This crate ties the xurkit codecs together behind one conversion step and
//! re-exports them for convenience.
//!
//! # Crates
//!
//! - [`xurkit_common`] - Big-endian binary reader/writer, packed integers, XML tree
//! - [`xurkit_schema`] - Schema registry of classes and property definitions
//! - [`xurkit_model`] - Object tree, typed property values and their text forms
//! - [`xurkit_xui`] - XUI (XML) reader and writer
//! - [`xurkit_xur`] - XUR binary reader and writer, versions 5 and 8
//!
//! # Example
//!
//! ```no_run
//! use xurkit::prelude::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_group("xui", "schemas/XuiElements.xml")?;
//! registry.set_current_group("xui");
//!
//! let converter = Converter::new(registry.current_group());
//! converter.convert("menu.xui", FileFormat::Xur8, "menu.xur")?;
//!
//! let status = converter.mass_convert("scenes", FileFormat::Xur5, "out", None)?;
//! println!("{} of {} converted", status.succeeded, status.total);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod convert;
mod error;
mod format;

pub use xurkit_common as common;
pub use xurkit_model as model;
pub use xurkit_schema as schema;
pub use xurkit_xui as xui;
pub use xurkit_xur as xur;

pub use convert::{scan_directory, BatchEntry, BatchStatus, Converter, ProgressSink};
pub use error::{Error, Result};
pub use format::{detect_format, is_convertible, FileFormat};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{detect_format, scan_directory, BatchEntry, BatchStatus, Converter, FileFormat, ProgressSink};
    pub use xurkit_model::{Property, PropertyValue, UIObject, Value};
    pub use xurkit_schema::{SchemaGroup, SchemaRegistry};
    pub use xurkit_xui::{XuiReader, XuiWriter};
    pub use xurkit_xur::{XurDocument, XurReader, XurVersion, XurWriteOptions, XurWriter};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
