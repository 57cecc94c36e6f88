//! XUI document reader.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};
use xurkit_common::xml::{self, XmlNode};
use xurkit_model::{
    text, AnimationPath, ClassLayout, Command, Interpolation, Keyframe, NamedFrame, Property,
    PropertyValue, Timeline, UIObject, Value, Vec2, DEFAULT_FIGURE_SIZE, MAX_DEPTH,
};
use xurkit_schema::{PropertyDefinition, PropertyType, SchemaGroup};

use crate::{tags, Error, Result};

/// Reads XUI documents into object trees, resolving names through a schema group.
pub struct XuiReader<'g> {
    group: &'g SchemaGroup,
}

impl<'g> XuiReader<'g> {
    pub fn new(group: &'g SchemaGroup) -> Self {
        Self { group }
    }

    /// Read a document from disk.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<UIObject> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.read_str(&text)
    }

    /// Read a document from text.
    pub fn read_str(&self, xml: &str) -> Result<UIObject> {
        let root = xml::parse_document(xml)?;
        self.read_object(&root, 1)
    }

    fn layout(&self, class_name: &str) -> Result<ClassLayout> {
        ClassLayout::resolve(self.group, class_name).map_err(|e| match e {
            xurkit_schema::Error::UnknownClass(name) => Error::UnknownClass(name),
            other => Error::Schema(other),
        })
    }

    fn read_object(&self, node: &XmlNode, depth: usize) -> Result<UIObject> {
        if depth > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        let layout = self.layout(&node.tag)?;
        let mut object = UIObject::new(node.tag.as_str());

        if let Some(properties) = node.find(tags::PROPERTIES) {
            object.properties = self.read_property_list(properties, &node.tag, |name| {
                layout.find(name).map(|(_, _, definition)| Arc::clone(definition))
            })?;
        }

        for child in &node.children {
            if child.tag != tags::PROPERTIES && child.tag != tags::TIMELINES {
                object.children.push(self.read_object(child, depth + 1)?);
            }
        }

        // Timelines address children, so they are read last.
        if let Some(timelines) = node.find(tags::TIMELINES) {
            self.read_timelines(&mut object, timelines)?;
        }

        debug!(
            "read {} with {} properties and {} children",
            object.class_name,
            object.properties.len(),
            object.children.len()
        );
        Ok(object)
    }

    /// Read the property elements under `container`.
    ///
    /// Repeated elements of an indexed property are gathered into one value
    /// list ordered by their `index` attribute.
    fn read_property_list(
        &self,
        container: &XmlNode,
        owner: &str,
        resolve: impl Fn(&str) -> Option<Arc<PropertyDefinition>>,
    ) -> Result<Vec<Property>> {
        let mut properties: Vec<Property> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for element in &container.children {
            let name = element.tag.as_str();
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);

            let definition = resolve(name).ok_or_else(|| Error::UnknownProperty {
                class: owner.to_string(),
                property: name.to_string(),
            })?;
            let bounds = figure_bounds(&properties);

            let value = if definition.is_indexed() {
                let mut stops: Vec<(usize, &XmlNode)> = Vec::new();
                for (position, stop) in container.find_all(name).enumerate() {
                    let index = match stop.attribute(tags::INDEX) {
                        Some(text) => parse_number(name, text)?,
                        None => position,
                    };
                    stops.push((index, stop));
                }
                stops.sort_by_key(|(index, _)| *index);

                let values = stops
                    .into_iter()
                    .map(|(_, stop)| self.read_value(&definition, stop, bounds))
                    .collect::<Result<Vec<_>>>()?;
                PropertyValue::Indexed(values)
            } else {
                if container.find_all(name).count() > 1 {
                    warn!("{} sets '{}' more than once; using the first", owner, name);
                }
                PropertyValue::Single(self.read_value(&definition, element, bounds)?)
            };

            properties.push(Property::new(definition, value)?);
        }

        Ok(properties)
    }

    fn read_value(&self, definition: &Arc<PropertyDefinition>, element: &XmlNode, bounds: Vec2) -> Result<Value> {
        if definition.property_type == PropertyType::Object {
            let members = self.read_property_list(element, &definition.name, |name| {
                definition.find_member(name).map(|(_, member)| Arc::clone(member))
            })?;
            return Ok(Value::Compound(members));
        }
        Ok(text::parse_value(definition, &element.text, bounds)?)
    }

    fn read_timelines(&self, object: &mut UIObject, node: &XmlNode) -> Result<()> {
        if let Some(named_frames) = node.find(tags::NAMED_FRAMES) {
            for frame in named_frames.find_all(tags::NAMED_FRAME) {
                object.named_frames.push(read_named_frame(frame)?);
            }
        }

        for element in node.find_all(tags::TIMELINE) {
            let timeline = self.read_timeline(object, element)?;
            object.timelines.push(timeline);
        }
        Ok(())
    }

    fn read_timeline(&self, object: &UIObject, node: &XmlNode) -> Result<Timeline> {
        let id = required_text(node, tags::ID)?;
        let target = object
            .find_child_by_id(id)
            .ok_or_else(|| Error::UnknownTimelineTarget(id.to_string()))?;
        let layout = self.layout(&target.class_name)?;

        let paths = node
            .find_all(tags::TIMELINE_PROP)
            .map(|prop| resolve_path(&layout, &target.class_name, &prop.text))
            .collect::<Result<Vec<_>>>()?;
        let bounds = figure_bounds(&target.properties);

        let mut timeline = Timeline::new(id);
        for element in node.find_all(tags::KEYFRAME) {
            let values: Vec<&XmlNode> = element.find_all(tags::PROP).collect();
            if values.len() != paths.len() {
                return Err(Error::KeyframeValueCount {
                    target: id.to_string(),
                    expected: paths.len(),
                    found: values.len(),
                });
            }

            let mut keyframe = Keyframe {
                frame: optional_number(element, tags::TIME)?.unwrap_or(0),
                interpolation: match element.child_text(tags::INTERPOLATION) {
                    Some(text) if !text.is_empty() => Interpolation::parse(text)?,
                    _ => Interpolation::Linear,
                },
                ease_in: optional_number(element, tags::EASE_IN)?.unwrap_or(0),
                ease_out: optional_number(element, tags::EASE_OUT)?.unwrap_or(0),
                ease_scale: optional_number(element, tags::EASE_SCALE)?.unwrap_or(0),
                properties: Vec::with_capacity(paths.len()),
            };

            for (path, value) in paths.iter().zip(values) {
                let Some(leaf) = path.last() else { continue };
                let value = text::parse_value(leaf, &value.text, bounds)?;
                keyframe.properties.push(Property::from_animation_path(path, value)?);
            }
            timeline.keyframes.push(keyframe);
        }

        Ok(timeline)
    }
}

/// Resolve a dotted property path such as `Fill.FillColor`.
fn resolve_path(layout: &ClassLayout, class_name: &str, dotted: &str) -> Result<AnimationPath> {
    let unknown = || Error::UnknownProperty {
        class: class_name.to_string(),
        property: dotted.to_string(),
    };

    let mut names = dotted.trim().split('.');
    let first = names.next().ok_or_else(unknown)?;
    let (_, _, definition) = layout.find(first).ok_or_else(unknown)?;

    let mut path = vec![Arc::clone(definition)];
    for name in names {
        let member = path
            .last()
            .and_then(|parent| parent.find_member(name))
            .map(|(_, member)| Arc::clone(member))
            .ok_or_else(unknown)?;
        path.push(member);
    }
    Ok(path)
}

fn read_named_frame(node: &XmlNode) -> Result<NamedFrame> {
    let name = required_text(node, tags::NAME)?;
    let frame = optional_number(node, tags::TIME)?.unwrap_or(0);
    let command = match node.child_text(tags::COMMAND) {
        Some(text) if !text.is_empty() => Command::parse(text)?,
        _ => Command::Play,
    };
    let target = node.child_text(tags::COMMAND_TARGET).map(str::to_string);
    Ok(NamedFrame::new(name, frame, command, target)?)
}

/// Bounding box for figures, from `Width`/`Height` already read on the same object.
fn figure_bounds(properties: &[Property]) -> Vec2 {
    let dimension = |name: &str| {
        properties
            .iter()
            .find(|p| p.name() == name)
            .and_then(Property::single_value)
            .and_then(Value::as_float)
    };
    Vec2::new(
        dimension(tags::WIDTH).unwrap_or(DEFAULT_FIGURE_SIZE.x),
        dimension(tags::HEIGHT).unwrap_or(DEFAULT_FIGURE_SIZE.y),
    )
}

fn required_text<'a>(node: &'a XmlNode, tag: &str) -> Result<&'a str> {
    node.child_text(tag).ok_or_else(|| Error::MissingElement {
        parent: node.tag.clone(),
        element: tag.to_string(),
    })
}

fn optional_number<T: std::str::FromStr>(node: &XmlNode, tag: &str) -> Result<Option<T>> {
    match node.child_text(tag) {
        Some(text) if !text.is_empty() => parse_number(tag, text).map(Some),
        _ => Ok(None),
    }
}

fn parse_number<T: std::str::FromStr>(element: &str, text: &str) -> Result<T> {
    text.trim().parse().map_err(|_| Error::InvalidNumber {
        element: element.to_string(),
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::registry;
    use xurkit_model::Vec3;

    #[test]
    fn test_read_properties_and_children() {
        let registry = registry();
        let xml = r#"
<XuiCanvas version="000c">
  <Properties>
    <Width>640.000000</Width>
    <Height>480.000000</Height>
  </Properties>
  <XuiText>
    <Properties>
      <Id>Label</Id>
      <Text>Hello</Text>
      <Position>1,2,0</Position>
    </Properties>
  </XuiText>
</XuiCanvas>"#;

        let root = XuiReader::new(registry.current_group()).read_str(xml).unwrap();
        assert_eq!(root.class_name, "XuiCanvas");
        assert_eq!(root.properties.len(), 2);

        let label = root.find_child_by_id("Label").unwrap();
        assert_eq!(label.property("Text").unwrap().single_value(), Some(&Value::String("Hello".into())));
        assert_eq!(
            label.property("Position").unwrap().single_value(),
            Some(&Value::Vector(Vec3::new(1.0, 2.0, 0.0)))
        );
    }

    #[test]
    fn test_indexed_and_nested() {
        let registry = registry();
        let xml = r#"
<XuiCanvas>
  <XuiFigure>
    <Properties>
      <Width>100</Width>
      <Height>40</Height>
      <Fill>
        <FillColor>0xff00ff00</FillColor>
        <StopPos index="1">1.0</StopPos>
        <StopPos index="0">0.25</StopPos>
      </Fill>
      <Shape>0</Shape>
    </Properties>
  </XuiFigure>
</XuiCanvas>"#;

        let root = XuiReader::new(registry.current_group()).read_str(xml).unwrap();
        let figure = &root.children[0];

        let fill = figure.property("Fill").unwrap().single_value().unwrap();
        let members = fill.as_compound().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].values(), &[Value::Float(0.25), Value::Float(1.0)]);

        let Some(Value::Figure(shape)) = figure.property("Shape").unwrap().single_value() else {
            panic!("expected figure");
        };
        assert_eq!(shape.bounds, Vec2::new(100.0, 40.0));
    }

    #[test]
    fn test_timelines() {
        let registry = registry();
        let xml = r#"
<XuiCanvas>
  <XuiFigure>
    <Properties><Id>Box</Id></Properties>
  </XuiFigure>
  <Timelines>
    <NamedFrames>
      <NamedFrame><Name>start</Name><Time>0</Time><Command>play</Command></NamedFrame>
      <NamedFrame><Name>loop</Name><Time>30</Time><Command>goto</Command><CommandTarget>start</CommandTarget></NamedFrame>
    </NamedFrames>
    <Timeline>
      <Id>Box</Id>
      <TimelineProp>Fill.FillColor</TimelineProp>
      <TimelineProp>Width</TimelineProp>
      <KeyFrame><Time>0</Time><Interpolation>0</Interpolation><Prop>0xff000000</Prop><Prop>10</Prop></KeyFrame>
      <KeyFrame><Time>30</Time><Interpolation>2</Interpolation><EaseIn>-50</EaseIn><Prop>0xffffffff</Prop><Prop>20</Prop></KeyFrame>
    </Timeline>
  </Timelines>
</XuiCanvas>"#;

        let root = XuiReader::new(registry.current_group()).read_str(xml).unwrap();
        assert_eq!(root.named_frames.len(), 2);
        assert_eq!(root.named_frames[1].command, Command::GoTo);

        let timeline = &root.timelines[0];
        assert_eq!(timeline.target, "Box");
        assert_eq!(timeline.keyframes.len(), 2);
        assert_eq!(timeline.keyframes[1].ease_in, -50);
        assert_eq!(timeline.keyframes[1].interpolation, Interpolation::Ease);

        let paths = timeline.paths().unwrap();
        assert_eq!(paths[0].len(), 2);
        assert_eq!(paths[0][1].name, "FillColor");
    }

    #[test]
    fn test_unknown_names_are_fatal() {
        let registry = registry();
        let reader = XuiReader::new(registry.current_group());
        assert!(matches!(
            reader.read_str("<XuiCanvas><XuiBogus/></XuiCanvas>"),
            Err(Error::UnknownClass(_))
        ));
        assert!(matches!(
            reader.read_str("<XuiCanvas><Properties><Bogus>1</Bogus></Properties></XuiCanvas>"),
            Err(Error::UnknownProperty { .. })
        ));
    }

    #[test]
    fn test_keyframe_value_count_checked() {
        let registry = registry();
        let xml = r#"
<XuiCanvas>
  <XuiText><Properties><Id>T</Id></Properties></XuiText>
  <Timelines>
    <Timeline><Id>T</Id><TimelineProp>Width</TimelineProp><KeyFrame><Time>0</Time></KeyFrame></Timeline>
  </Timelines>
</XuiCanvas>"#;
        assert!(matches!(
            XuiReader::new(registry.current_group()).read_str(xml),
            Err(Error::KeyframeValueCount { expected: 1, found: 0, .. })
        ));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let registry = registry();
        let depth = MAX_DEPTH + 10;
        let xml = format!(
            "<XuiCanvas>{}{}</XuiCanvas>",
            "<XuiText>".repeat(depth - 1),
            "</XuiText>".repeat(depth - 1)
        );
        assert!(matches!(
            XuiReader::new(registry.current_group()).read_str(&xml),
            Err(Error::NestingTooDeep(MAX_DEPTH))
        ));
    }

    #[test]
    fn test_string_values_are_verbatim() {
        let mut registry = xurkit_schema::SchemaRegistry::new();
        let schema = r#"
<XuiSchema>
  <Class Name="XuiElement">
    <Property Id="0" Name="Id" Type="string" Default="Label"/>
  </Class>
  <Class Name="XuiCanvas" BaseClassName="XuiElement"/>
  <Class Name="XuiText" BaseClassName="XuiElement">
    <Property Id="10" Name="Text" Type="string"/>
  </Class>
</XuiSchema>"#;
        registry.register_source("xui", "elements.xml", schema).unwrap();
        registry.set_current_group("xui");
        let reader = XuiReader::new(registry.current_group());

        let xml = "<XuiCanvas><XuiText><Properties><Id></Id><Text>  padded  </Text></Properties></XuiText></XuiCanvas>";
        let root = reader.read_str(xml).unwrap();
        let text = &root.children[0];
        assert_eq!(text.property("Id").unwrap().single_value(), Some(&Value::String(String::new())));
        assert_eq!(
            text.property("Text").unwrap().single_value(),
            Some(&Value::String("  padded  ".into()))
        );

        let written = crate::XuiWriter::write_string(&root).unwrap();
        assert!(written.contains("<Text>  padded  </Text>"));
        assert_eq!(reader.read_str(&written).unwrap(), root);
    }
}
