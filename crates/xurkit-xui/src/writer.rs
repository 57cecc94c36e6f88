//! XUI document writer.

use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use xurkit_model::{text, Keyframe, NamedFrame, Property, Timeline, UIObject, Value, MAX_DEPTH};

use crate::{tags, Error, Result, XUI_VERSION};

/// Writes object trees as XUI documents.
///
/// Output has no XML declaration, uses `\n` line endings and tab
/// indentation, and carries the fixed `version` attribute on the root.
pub struct XuiWriter {
    writer: Writer<Vec<u8>>,
}

impl XuiWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b'\t', 1),
        }
    }

    /// Serialize a tree to a string.
    pub fn write_string(root: &UIObject) -> Result<String> {
        if !root.is_canvas() {
            return Err(Error::InvalidRoot(root.class_name.clone()));
        }
        if root.depth() > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }

        let mut out = Self::new();
        out.write_object(root, true)?;
        let mut text = String::from_utf8(out.writer.into_inner()).map_err(|e| Error::Xml(e.to_string()))?;
        text.push('\n');
        Ok(text)
    }

    /// Serialize a tree to a file; nothing is written if serialization fails.
    pub fn write_file(root: &UIObject, path: impl AsRef<Path>) -> Result<()> {
        let text = Self::write_string(root)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn write_object(&mut self, object: &UIObject, is_root: bool) -> Result<()> {
        let mut start = BytesStart::new(object.class_name.as_str());
        if is_root {
            start.push_attribute(("version", XUI_VERSION));
        }

        if object.properties.is_empty() && object.children.is_empty() && !object.has_animation() {
            return self.event(Event::Empty(start));
        }
        self.event(Event::Start(start))?;

        if !object.properties.is_empty() {
            self.start(tags::PROPERTIES)?;
            for property in &object.properties {
                self.write_property(property)?;
            }
            self.end(tags::PROPERTIES)?;
        }

        for child in &object.children {
            self.write_object(child, false)?;
        }

        if object.has_animation() {
            self.start(tags::TIMELINES)?;
            if !object.named_frames.is_empty() {
                self.start(tags::NAMED_FRAMES)?;
                for frame in &object.named_frames {
                    self.write_named_frame(frame)?;
                }
                self.end(tags::NAMED_FRAMES)?;
            }
            for timeline in &object.timelines {
                self.write_timeline(timeline)?;
            }
            self.end(tags::TIMELINES)?;
        }

        self.end(&object.class_name)
    }

    fn write_property(&mut self, property: &Property) -> Result<()> {
        let name = property.name();
        let indexed = property.definition().is_indexed();

        for (index, value) in property.values().iter().enumerate() {
            let mut start = BytesStart::new(name);
            if indexed {
                start.push_attribute((tags::INDEX, index.to_string().as_str()));
            }

            match value {
                Value::Compound(members) if members.is_empty() => self.event(Event::Empty(start))?,
                Value::Compound(members) => {
                    self.event(Event::Start(start))?;
                    for member in members {
                        self.write_property(member)?;
                    }
                    self.end(name)?;
                }
                scalar => {
                    let text = normalize(&text::format_value(scalar));
                    self.text_element(start, &text)?;
                }
            }
        }
        Ok(())
    }

    fn write_named_frame(&mut self, frame: &NamedFrame) -> Result<()> {
        self.start(tags::NAMED_FRAME)?;
        self.simple(tags::NAME, &frame.name)?;
        self.simple(tags::TIME, &frame.frame.to_string())?;
        self.simple(tags::COMMAND, frame.command.as_str())?;
        if let Some(target) = &frame.target {
            self.simple(tags::COMMAND_TARGET, target)?;
        }
        self.end(tags::NAMED_FRAME)
    }

    fn write_timeline(&mut self, timeline: &Timeline) -> Result<()> {
        let paths = timeline.paths()?;

        self.start(tags::TIMELINE)?;
        self.simple(tags::ID, &timeline.target)?;
        for path in &paths {
            let dotted = path.iter().map(|d| d.name.as_str()).collect::<Vec<_>>().join(".");
            self.simple(tags::TIMELINE_PROP, &dotted)?;
        }
        for keyframe in &timeline.keyframes {
            self.write_keyframe(keyframe)?;
        }
        self.end(tags::TIMELINE)
    }

    fn write_keyframe(&mut self, keyframe: &Keyframe) -> Result<()> {
        self.start(tags::KEYFRAME)?;
        self.simple(tags::TIME, &keyframe.frame.to_string())?;
        self.simple(tags::INTERPOLATION, &(keyframe.interpolation as u8).to_string())?;
        self.simple(tags::EASE_IN, &keyframe.ease_in.to_string())?;
        self.simple(tags::EASE_OUT, &keyframe.ease_out.to_string())?;
        self.simple(tags::EASE_SCALE, &keyframe.ease_scale.to_string())?;
        for property in &keyframe.properties {
            let (_, leaf) = property.animation_path()?;
            self.simple(tags::PROP, &normalize(&text::format_value(leaf)))?;
        }
        self.end(tags::KEYFRAME)
    }

    fn simple(&mut self, tag: &str, text: &str) -> Result<()> {
        self.text_element(BytesStart::new(tag), text)
    }

    fn text_element(&mut self, start: BytesStart<'_>, text: &str) -> Result<()> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        if text.is_empty() {
            return self.event(Event::Empty(start));
        }
        self.event(Event::Start(start))?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end(&name)
    }

    fn start(&mut self, tag: &str) -> Result<()> {
        self.event(Event::Start(BytesStart::new(tag)))
    }

    fn end(&mut self, tag: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(tag)))
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| Error::Xml(e.to_string()))
    }
}

impl Default for XuiWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::registry;
    use crate::XuiReader;

    const DOCUMENT: &str = r#"
<XuiCanvas version="000c">
  <Properties>
    <Width>640</Width>
    <Height>480</Height>
  </Properties>
  <XuiFigure>
    <Properties>
      <Id>Box</Id>
      <Fill>
        <FillColor>0xff00ff00</FillColor>
        <StopPos index="0">0.25</StopPos>
        <StopPos index="1">1.0</StopPos>
      </Fill>
      <Shape>1,1,2,3,4,5,6,0</Shape>
    </Properties>
  </XuiFigure>
  <Timelines>
    <NamedFrames>
      <NamedFrame><Name>end</Name><Time>10</Time><Command>stop</Command></NamedFrame>
    </NamedFrames>
    <Timeline>
      <Id>Box</Id>
      <TimelineProp>Fill.FillColor</TimelineProp>
      <KeyFrame><Time>0</Time><Prop>0xff000000</Prop></KeyFrame>
      <KeyFrame><Time>10</Time><Prop>0xffffffff</Prop></KeyFrame>
    </Timeline>
  </Timelines>
</XuiCanvas>"#;

    #[test]
    fn test_write_then_read_back() {
        let registry = registry();
        let reader = XuiReader::new(registry.current_group());
        let tree = reader.read_str(DOCUMENT).unwrap();

        let text = XuiWriter::write_string(&tree).unwrap();
        assert!(text.starts_with("<XuiCanvas version=\"000c\">"));
        assert!(!text.contains("<?xml"));
        assert!(!text.contains('\r'));
        assert!(text.contains("<StopPos index=\"1\">1.000000</StopPos>"));
        assert!(text.contains("<TimelineProp>Fill.FillColor</TimelineProp>"));

        let again = reader.read_str(&text).unwrap();
        assert_eq!(again, tree);
    }

    #[test]
    fn test_invalid_root_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xui");

        let result = XuiWriter::write_file(&UIObject::new("XuiScene"), &path);
        assert!(matches!(result, Err(Error::InvalidRoot(_))));
        assert!(!path.exists());
    }
}
