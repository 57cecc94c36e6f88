//! Schema registry for XUI class and property definitions.
//!
//! A schema file declares classes, each with an optional base class and an
//! ordered list of typed property definitions. Files are registered into
//! named groups; both codecs resolve class names and property lookups
//! through a [`SchemaGroup`].
//!
//! # Schema format
//!
//! ```xml
//! <XuiSchema>
//!   <Class Name="XuiElement">
//!     <Property Id="0" Name="Id" Type="string"/>
//!     <Property Id="1" Name="Fill" Type="object">
//!       <Property Id="0" Name="FillColor" Type="colour"/>
//!     </Property>
//!   </Class>
//!   <IgnoreProperties>
//!     <Ignore Class="XuiElement" Property="Id"/>
//!   </IgnoreProperties>
//!   <Include Path="custom.xml"/>
//! </XuiSchema>
//! ```

mod definition;
mod error;
mod loader;
mod registry;
mod types;

pub use definition::{Class, PropertyDefinition};
pub use error::{Error, Result};
pub use loader::{load_file, load_source, IgnoreEntry, SchemaFile};
pub use registry::{SchemaGroup, SchemaRegistry, DEFAULT_GROUP};
pub use types::{PropertyFlags, PropertyType};
