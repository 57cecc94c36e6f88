//! In-memory model of a UI resource.
//!
//! A document is a tree of [`UIObject`]s. Each object names its schema class
//! and carries typed [`Property`] values, child objects, [`NamedFrame`]s and
//! [`Timeline`]s. The XUI and XUR codecs both read into and write from this
//! model, so converting between formats is decode-then-encode.

mod error;
mod layout;
mod object;
mod property;
mod timeline;
mod value;

pub mod text;

pub use error::{Error, Result};
pub use layout::ClassLayout;
pub use object::{Descendants, UIObject, ID_PROPERTY, MAX_DEPTH, ROOT_CLASS};
pub use property::Property;
pub use timeline::{AnimationPath, Command, Interpolation, Keyframe, NamedFrame, Timeline};
pub use value::{colour, BezierPoint, Figure, PropertyValue, Value, DEFAULT_FIGURE_SIZE};

/// Re-export the math types used by values.
pub use glam::{Quat, Vec2, Vec3};
