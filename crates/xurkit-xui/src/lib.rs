//! XUI document support.
//!
//! XUI is the XML authoring form of a UI resource. Each element names a
//! schema class; its `Properties` child holds typed property values, other
//! element children are child objects, and an optional `Timelines` child
//! holds named frames and keyframed animation of the children.
//!
//! ```xml
//! <XuiCanvas version="000c">
//!   <Properties>
//!     <Width>640.000000</Width>
//!   </Properties>
//!   <XuiText>
//!     <Properties>
//!       <Id>Title</Id>
//!     </Properties>
//!   </XuiText>
//! </XuiCanvas>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use xurkit_schema::SchemaRegistry;
//! use xurkit_xui::{XuiReader, XuiWriter};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_group("xui", "schemas/XuiElements.xml")?;
//! registry.set_current_group("xui");
//!
//! let tree = XuiReader::new(registry.current_group()).read_file("menu.xui")?;
//! XuiWriter::write_file(&tree, "menu_copy.xui")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::XuiReader;
pub use writer::XuiWriter;

/// Value of the `version` attribute written on the root element.
pub const XUI_VERSION: &str = "000c";

/// Element names of the XUI container structure.
pub(crate) mod tags {
    pub const PROPERTIES: &str = "Properties";
    pub const TIMELINES: &str = "Timelines";
    pub const NAMED_FRAMES: &str = "NamedFrames";
    pub const NAMED_FRAME: &str = "NamedFrame";
    pub const TIMELINE: &str = "Timeline";
    pub const TIMELINE_PROP: &str = "TimelineProp";
    pub const KEYFRAME: &str = "KeyFrame";
    pub const PROP: &str = "Prop";
    pub const NAME: &str = "Name";
    pub const TIME: &str = "Time";
    pub const COMMAND: &str = "Command";
    pub const COMMAND_TARGET: &str = "CommandTarget";
    pub const INTERPOLATION: &str = "Interpolation";
    pub const EASE_IN: &str = "EaseIn";
    pub const EASE_OUT: &str = "EaseOut";
    pub const EASE_SCALE: &str = "EaseScale";
    pub const ID: &str = "Id";
    pub const INDEX: &str = "index";
    pub const WIDTH: &str = "Width";
    pub const HEIGHT: &str = "Height";
}
