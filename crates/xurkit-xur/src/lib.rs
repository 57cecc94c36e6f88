//! XUR binary UI resource support.
//!
//! A XUR file is the compiled form of a XUI document. It starts with a
//! 20-byte header, optionally followed by a count header of ten structural
//! totals, then a table of `{magic, offset, length}` section entries. Values
//! are deduplicated into typed pool sections and the `DATA` section encodes
//! the object tree with references into those pools. All integers are
//! big-endian.
//!
//! | Section | Contents | Versions |
//! |---------|----------|----------|
//! | `STRN`  | UTF-16 strings | 5, 8 |
//! | `VECT`  | 3 × f32 vectors | 5, 8 |
//! | `QUAT`  | 4 × f32 quaternions | 5, 8 |
//! | `CUST`  | figure shapes | 5, 8 |
//! | `FLOT`  | f32 values | 8 |
//! | `COLR`  | ARGB colours | 8 |
//! | `KEYP`  | keyframe value references | 8 |
//! | `KEYD`  | keyframe records | 8 |
//! | `NAMD`  | named frame records | 8 |
//! | `DATA`  | object tree | 5, 8 |
//!
//! # Example
//!
//! ```no_run
//! use xurkit_schema::SchemaRegistry;
//! use xurkit_xur::{XurReader, XurVersion, XurWriteOptions, XurWriter};
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register_group("xui", "schemas/XuiElements.xml")?;
//! registry.set_current_group("xui");
//! let group = registry.current_group();
//!
//! let document = XurReader::new(group).read_file("menu.xur")?;
//! XurWriter::new(group, XurWriteOptions::for_version(XurVersion::V5))
//!     .write_file(&document.root, "menu_v5.xur")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod collect;
mod counts;
mod error;
mod header;
mod pool;
mod reader;
mod records;
mod writer;

pub use counts::StructureCounts;
pub use error::{Error, Result};
pub use header::{CountHeader, SectionEntry, SectionKind, XurHeader, XurVersion};
pub use reader::{XurDocument, XurReader};
pub use writer::{XurWriteOptions, XurWriter, DEFAULT_TOOL_VERSION};

/// Object flag: a property list follows.
pub(crate) const OBJECT_HAS_PROPERTIES: u8 = 0x01;
/// Object flag: a child list follows.
pub(crate) const OBJECT_HAS_CHILDREN: u8 = 0x02;
/// Object flag: named frames and timelines follow.
pub(crate) const OBJECT_HAS_TIMELINES: u8 = 0x04;

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use xurkit_model::{
        BezierPoint, ClassLayout, Command, Figure, Keyframe, NamedFrame, Property, PropertyValue, Timeline,
        UIObject, Value, Vec2, Vec3,
    };
    use xurkit_schema::{PropertyDefinition, SchemaGroup, SchemaRegistry};

    pub const SCHEMA: &str = r#"
<XuiSchema>
  <Class Name="XuiElement">
    <Property Id="0" Name="Id" Type="string"/>
    <Property Id="1" Name="Width" Type="float" Default="60"/>
    <Property Id="2" Name="Height" Type="float" Default="30"/>
    <Property Id="3" Name="Position" Type="vector"/>
    <Property Id="4" Name="Fill" Type="object">
      <Property Id="0" Name="FillColor" Type="colour"/>
      <Property Id="1" Name="StopPos" Type="float" Flags="indexed"/>
    </Property>
  </Class>
  <Class Name="XuiCanvas" BaseClassName="XuiElement"/>
  <Class Name="XuiText" BaseClassName="XuiElement">
    <Property Id="10" Name="Text" Type="string" Flags="localized"/>
    <Property Id="11" Name="Visible" Type="bool"/>
    <Property Id="12" Name="Layer" Type="integer"/>
  </Class>
  <Class Name="XuiFigure" BaseClassName="XuiElement">
    <Property Id="20" Name="Shape" Type="custom"/>
  </Class>
</XuiSchema>"#;

    pub fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register_source("xui", "elements.xml", SCHEMA).unwrap();
        registry.set_current_group("xui");
        registry
    }

    pub fn def(group: &SchemaGroup, class: &str, name: &str) -> Arc<PropertyDefinition> {
        let layout = ClassLayout::resolve(group, class).unwrap();
        Arc::clone(layout.find(name).unwrap().2)
    }

    fn member(parent: &PropertyDefinition, name: &str) -> Arc<PropertyDefinition> {
        Arc::clone(parent.find_member(name).unwrap().1)
    }

    /// A canvas with a figure and a text child, two named frames and one
    /// timeline animating the figure's fill colour and width.
    pub fn sample_tree() -> UIObject {
        let registry = registry();
        let group = registry.current_group();

        let id = def(group, "XuiElement", "Id");
        let width = def(group, "XuiElement", "Width");
        let position = def(group, "XuiElement", "Position");
        let fill = def(group, "XuiElement", "Fill");
        let fill_color = member(&fill, "FillColor");
        let stop_pos = member(&fill, "StopPos");

        let mut root = UIObject::new("XuiCanvas");
        root.properties
            .push(Property::single(Arc::clone(&width), Value::Float(640.0)).unwrap());

        let mut figure = UIObject::new("XuiFigure");
        figure
            .properties
            .push(Property::single(Arc::clone(&id), Value::String("Box".into())).unwrap());
        figure
            .properties
            .push(Property::single(Arc::clone(&width), Value::Float(120.5)).unwrap());
        figure.properties.push(
            Property::single(
                Arc::clone(&fill),
                Value::Compound(vec![
                    Property::single(Arc::clone(&fill_color), Value::Colour(0xff00ff00)).unwrap(),
                    Property::new(
                        stop_pos,
                        PropertyValue::Indexed(vec![Value::Float(0.0), Value::Float(1.0)]),
                    )
                    .unwrap(),
                ]),
            )
            .unwrap(),
        );
        figure.properties.push(
            Property::single(
                def(group, "XuiFigure", "Shape"),
                Value::Figure(Figure {
                    bounds: Vec2::new(120.5, 30.0),
                    points: vec![BezierPoint {
                        point: Vec2::new(0.0, 0.0),
                        ctrl1: Vec2::new(1.0, 2.0),
                        ctrl2: Vec2::new(3.0, 4.0),
                        smoothing: 1,
                    }],
                }),
            )
            .unwrap(),
        );

        let mut text = UIObject::new("XuiText");
        text.properties
            .push(Property::single(Arc::clone(&id), Value::String("Label".into())).unwrap());
        text.properties
            .push(Property::single(position, Value::Vector(Vec3::new(10.0, 20.0, 0.0))).unwrap());
        text.properties
            .push(Property::single(def(group, "XuiText", "Visible"), Value::Bool(true)).unwrap());
        text.properties
            .push(Property::single(def(group, "XuiText", "Layer"), Value::Int(-3)).unwrap());

        root.children.push(figure);
        root.children.push(text);

        root.named_frames
            .push(NamedFrame::new("intro", 0, Command::Play, None).unwrap());
        root.named_frames
            .push(NamedFrame::new("loop", 30, Command::GoToAndPlay, Some("intro".into())).unwrap());

        let mut timeline = Timeline::new("Box");
        for (frame, colour, w) in [(0, 0xff000000, 100.0), (30, 0xffffffff, 200.0)] {
            let mut keyframe = Keyframe::new(frame);
            keyframe.ease_in = -50;
            keyframe.properties.push(
                Property::from_animation_path(&[Arc::clone(&fill), Arc::clone(&fill_color)], Value::Colour(colour))
                    .unwrap(),
            );
            keyframe
                .properties
                .push(Property::from_animation_path(&[Arc::clone(&width)], Value::Float(w)).unwrap());
            timeline.keyframes.push(keyframe);
        }
        root.timelines.push(timeline);

        root
    }
}
