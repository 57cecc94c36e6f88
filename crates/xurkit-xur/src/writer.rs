//! XUR writer.

use std::path::Path;

use tracing::debug;
use xurkit_common::BinaryWriter;
use xurkit_model::{ClassLayout, NamedFrame, Property, PropertyValue, Timeline, UIObject, Value, MAX_DEPTH};
use xurkit_schema::{PropertyDefinition, SchemaGroup};
use zerocopy::byteorder::{U16, U32};

use crate::collect::ValuePools;
use crate::records::{KeyframeRecord, NamedFrameRecord, NamedFrameTable};
use crate::{
    CountHeader, Error, Result, SectionEntry, SectionKind, StructureCounts, XurHeader, XurVersion,
    OBJECT_HAS_CHILDREN, OBJECT_HAS_PROPERTIES, OBJECT_HAS_TIMELINES,
};

/// Tool version written when none is configured.
pub const DEFAULT_TOOL_VERSION: u16 = 0x000C;

/// Options controlling XUR output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XurWriteOptions {
    pub version: XurVersion,
    /// Emit the count header in version 8 files. Version 5 always has one.
    pub count_header: bool,
    pub tool_version: u16,
}

impl XurWriteOptions {
    /// Default options for a wire version.
    pub fn for_version(version: XurVersion) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }
}

impl Default for XurWriteOptions {
    fn default() -> Self {
        Self {
            version: XurVersion::V8,
            count_header: true,
            tool_version: DEFAULT_TOOL_VERSION,
        }
    }
}

/// Writes object trees as XUR files.
///
/// The whole file is assembled in memory, so a failed write leaves nothing
/// behind on disk.
pub struct XurWriter<'g> {
    group: &'g SchemaGroup,
    options: XurWriteOptions,
}

impl<'g> XurWriter<'g> {
    pub fn new(group: &'g SchemaGroup, options: XurWriteOptions) -> Self {
        Self { group, options }
    }

    pub fn options(&self) -> &XurWriteOptions {
        &self.options
    }

    /// Encode a tree and write it to `path`.
    pub fn write_file(&self, root: &UIObject, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.write_bytes(root)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Encode a tree.
    pub fn write_bytes(&self, root: &UIObject) -> Result<Vec<u8>> {
        if !root.is_canvas() {
            return Err(Error::InvalidRoot(root.class_name.clone()));
        }
        if root.depth() > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }

        let tree = self.without_ignored(root)?;
        let version = self.options.version;

        let counts = StructureCounts::from_tree(&tree)?;
        let pools = ValuePools::collect(&tree, version)?;

        let mut encoder = Encoder::new(self.group, version, &pools);
        let mut data = BinaryWriter::new();
        encoder.write_object(&mut data, &tree)?;

        let mut named_frames = BinaryWriter::new();
        encoder.named_frames.write(&mut named_frames);

        let mut sections: Vec<(SectionKind, &[u8])> = vec![
            (SectionKind::Strings, pools.strings.as_bytes()),
            (SectionKind::Vectors, pools.vectors.as_bytes()),
            (SectionKind::Quaternions, pools.quaternions.as_bytes()),
            (SectionKind::Figures, pools.figures.as_bytes()),
        ];
        if version.has_extended_pools() {
            sections.extend([
                (SectionKind::Floats, pools.floats.as_bytes()),
                (SectionKind::Colours, pools.colours.as_bytes()),
                (SectionKind::KeyframeValues, encoder.keyframe_values.as_bytes()),
                (SectionKind::Keyframes, encoder.keyframes.as_bytes()),
                (SectionKind::NamedFrames, named_frames.as_bytes()),
            ]);
        }
        sections.push((SectionKind::Data, data.as_bytes()));
        sections.retain(|(kind, bytes)| kind.is_required() || !bytes.is_empty());

        let count_header = version == XurVersion::V5 || self.options.count_header;
        let assembled = assemble(version, self.options.tool_version, count_header.then_some(&counts), &sections)?;

        debug!(
            "wrote XUR v{}: {} sections, {} objects, {} bytes",
            version.as_u32(),
            sections.len(),
            counts.object_count,
            assembled.len()
        );
        Ok(assembled)
    }

    /// Copy of the tree without the group's ignored properties.
    fn without_ignored(&self, root: &UIObject) -> Result<UIObject> {
        let mut tree = root.clone();
        let mut failure = None;
        tree.strip_properties(&mut |definition: &PropertyDefinition| match self.group.is_property_ignored(definition) {
            Ok(ignored) => ignored,
            Err(e) => {
                failure.get_or_insert(e);
                false
            }
        });
        match failure {
            Some(e) => Err(e.into()),
            None => Ok(tree),
        }
    }
}

/// Header, optional count header, section table, then payloads in table order.
pub(crate) fn assemble(
    version: XurVersion,
    tool_version: u16,
    counts: Option<&StructureCounts>,
    sections: &[(SectionKind, &[u8])],
) -> Result<Vec<u8>> {
    let mut table_end = XurHeader::SIZE + sections.len() * SectionEntry::SIZE;
    if counts.is_some() {
        table_end += CountHeader::SIZE;
    }

    let mut entries = Vec::with_capacity(sections.len());
    let mut offset = table_end;
    for (kind, bytes) in sections {
        let start = u32::try_from(offset).map_err(|_| Error::Overflow("section offset"))?;
        let length = u32::try_from(bytes.len()).map_err(|_| Error::Overflow("section length"))?;
        entries.push(SectionEntry::new(*kind, start, length));
        offset += bytes.len();
    }
    let expected = offset;

    let header = XurHeader {
        magic: *XurHeader::MAGIC,
        version: U32::new(version.as_u32()),
        flags: U32::new(if counts.is_some() { XurHeader::FLAG_COUNT_HEADER } else { 0 }),
        tool_version: U16::new(tool_version),
        file_size: U32::new(u32::try_from(expected).map_err(|_| Error::Overflow("file size"))?),
        section_count: U16::new(u16::try_from(sections.len()).map_err(|_| Error::Overflow("section count"))?),
    };

    let mut out = BinaryWriter::with_capacity(expected);
    out.write_struct(&header);
    if let Some(counts) = counts {
        out.write_struct(&CountHeader::from(counts));
    }
    for entry in &entries {
        out.write_struct(entry);
    }
    for (_, bytes) in sections {
        out.write_bytes(bytes);
    }

    if out.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: out.len(),
        });
    }
    Ok(out.into_inner())
}

/// State of one write: pool lookups plus the version 8 keyframe and named-frame tables.
struct Encoder<'a> {
    group: &'a SchemaGroup,
    version: XurVersion,
    pools: &'a ValuePools,
    keyframe_values: BinaryWriter,
    keyframe_value_count: u32,
    keyframes: BinaryWriter,
    keyframe_count: u32,
    named_frames: NamedFrameTable,
}

impl<'a> Encoder<'a> {
    fn new(group: &'a SchemaGroup, version: XurVersion, pools: &'a ValuePools) -> Self {
        Self {
            group,
            version,
            pools,
            keyframe_values: BinaryWriter::new(),
            keyframe_value_count: 0,
            keyframes: BinaryWriter::new(),
            keyframe_count: 0,
            named_frames: NamedFrameTable::new(),
        }
    }

    fn write_object(&mut self, out: &mut BinaryWriter, object: &UIObject) -> Result<()> {
        out.write_packed(self.pools.string_ref(&object.class_name)?);

        let mut flags = 0;
        if !object.properties.is_empty() {
            flags |= OBJECT_HAS_PROPERTIES;
        }
        if !object.children.is_empty() {
            flags |= OBJECT_HAS_CHILDREN;
        }
        if object.has_animation() {
            flags |= OBJECT_HAS_TIMELINES;
        }
        out.write_u8(flags);

        if !object.properties.is_empty() {
            let layout = ClassLayout::resolve(self.group, &object.class_name)?;
            out.write_packed_usize(object.properties.len());
            for property in &object.properties {
                let (depth, index) = layout
                    .locate(property.definition())
                    .ok_or_else(|| Error::ForeignProperty {
                        class: object.class_name.clone(),
                        property: property.name().to_string(),
                    })?;
                out.write_packed_usize(depth);
                out.write_packed_usize(index);
                self.write_property_value(out, property)?;
            }
        }

        if !object.children.is_empty() {
            out.write_packed_usize(object.children.len());
            for child in &object.children {
                self.write_object(out, child)?;
            }
        }

        if object.has_animation() {
            self.write_animation(out, object)?;
        }
        Ok(())
    }

    fn write_property_value(&mut self, out: &mut BinaryWriter, property: &Property) -> Result<()> {
        let definition = property.definition();
        match property.value() {
            PropertyValue::Single(value) => self.write_value(out, definition, value),
            PropertyValue::Indexed(values) => {
                out.write_packed_usize(values.len());
                for value in values {
                    self.write_value(out, definition, value)?;
                }
                Ok(())
            }
        }
    }

    fn write_value(&mut self, out: &mut BinaryWriter, definition: &PropertyDefinition, value: &Value) -> Result<()> {
        let extended = self.version.has_extended_pools();
        match value {
            Value::Bool(b) => out.write_bool(*b),
            Value::Int(v) => out.write_i32(*v),
            Value::UInt(v) => out.write_packed(*v),
            Value::Float(v) if extended => out.write_packed(self.pools.floats.index_of(v)?),
            Value::Float(v) => out.write_f32(*v),
            Value::String(s) => out.write_packed(self.pools.string_ref(s)?),
            Value::Colour(c) if extended => out.write_packed(self.pools.colours.index_of(c)?),
            Value::Colour(c) => out.write_u32(*c),
            Value::Vector(v) => out.write_packed(self.pools.vectors.index_of(v)?),
            Value::Quaternion(q) => out.write_packed(self.pools.quaternions.index_of(q)?),
            Value::Figure(f) => out.write_packed(self.pools.figures.index_of(f)?),
            Value::Compound(members) => {
                out.write_packed_usize(members.len());
                for member in members {
                    let (index, _) = definition
                        .find_member(member.name())
                        .ok_or_else(|| Error::ForeignProperty {
                            class: definition.name.clone(),
                            property: member.name().to_string(),
                        })?;
                    out.write_packed(0);
                    out.write_packed_usize(index);
                    self.write_property_value(out, member)?;
                }
            }
        }
        Ok(())
    }

    fn write_animation(&mut self, out: &mut BinaryWriter, object: &UIObject) -> Result<()> {
        let records = object
            .named_frames
            .iter()
            .map(|frame| self.named_frame_record(frame))
            .collect::<Result<Vec<_>>>()?;

        match self.version {
            XurVersion::V5 => {
                out.write_packed_usize(records.len());
                for record in &records {
                    record.write(out);
                }
            }
            XurVersion::V8 => {
                let count = records.len();
                let base = self.named_frames.claim(records)?;
                out.write_packed(base);
                out.write_packed_usize(count);
            }
        }

        out.write_packed_usize(object.timelines.len());
        for timeline in &object.timelines {
            self.write_timeline(out, object, timeline)?;
        }
        Ok(())
    }

    fn named_frame_record(&self, frame: &NamedFrame) -> Result<NamedFrameRecord> {
        Ok(NamedFrameRecord {
            name: self.pools.string_ref(&frame.name)?,
            frame: frame.frame,
            command: frame.command as u8,
            target: self.pools.string_ref(frame.target.as_deref().unwrap_or(""))?,
        })
    }

    fn write_timeline(&mut self, out: &mut BinaryWriter, object: &UIObject, timeline: &Timeline) -> Result<()> {
        let target = object
            .find_child_by_id(&timeline.target)
            .ok_or_else(|| Error::UnknownTimelineTarget(timeline.target.clone()))?;
        let layout = ClassLayout::resolve(self.group, &target.class_name)?;
        let paths = timeline.paths()?;

        out.write_packed(self.pools.string_ref(&timeline.target)?);
        out.write_packed_usize(paths.len());
        for path in &paths {
            let Some((first, rest)) = path.split_first() else {
                return Err(Error::InvalidValue(format!("empty path in timeline '{}'", timeline.target)));
            };
            let (depth, index) = layout.locate(first).ok_or_else(|| Error::ForeignProperty {
                class: target.class_name.clone(),
                property: first.name.clone(),
            })?;

            out.write_packed_usize(path.len());
            out.write_packed_usize(depth);
            out.write_packed_usize(index);

            let mut parent = first;
            for member in rest {
                let (index, _) = parent.find_member(&member.name).ok_or_else(|| Error::ForeignProperty {
                    class: parent.name.clone(),
                    property: member.name.clone(),
                })?;
                out.write_packed(0);
                out.write_packed_usize(index);
                parent = member;
            }
        }

        match self.version {
            XurVersion::V5 => {
                out.write_packed_usize(timeline.keyframes.len());
                for keyframe in &timeline.keyframes {
                    out.write_u32(keyframe.frame);
                    out.write_u8(keyframe.interpolation as u8);
                    out.write_u8(keyframe.ease_in as u8);
                    out.write_u8(keyframe.ease_out as u8);
                    out.write_u8(keyframe.ease_scale as u8);
                    for property in &keyframe.properties {
                        let (path, leaf) = property.animation_path()?;
                        if let Some(definition) = path.last() {
                            self.write_value(out, definition, leaf)?;
                        }
                    }
                }
            }
            XurVersion::V8 => {
                out.write_packed(self.keyframe_count);
                out.write_packed_usize(timeline.keyframes.len());
                for keyframe in &timeline.keyframes {
                    let record = KeyframeRecord {
                        frame: keyframe.frame,
                        interpolation: keyframe.interpolation as u8,
                        ease_in: keyframe.ease_in as u8,
                        ease_out: keyframe.ease_out as u8,
                        ease_scale: keyframe.ease_scale as u8,
                        first_value: self.keyframe_value_count,
                    };
                    for property in &keyframe.properties {
                        let (_, leaf) = property.animation_path()?;
                        let reference = self.keyframe_value_ref(leaf)?;
                        self.keyframe_values.write_packed(reference);
                        self.keyframe_value_count += 1;
                    }
                    record.write(&mut self.keyframes);
                    self.keyframe_count += 1;
                }
            }
        }
        Ok(())
    }

    /// `KEYP` reference of an animated leaf value.
    fn keyframe_value_ref(&self, value: &Value) -> Result<u32> {
        match value {
            Value::Bool(b) => Ok(u32::from(*b)),
            Value::Int(v) => Ok(*v as u32),
            Value::UInt(v) => Ok(*v),
            Value::Float(v) => self.pools.floats.index_of(v),
            Value::String(s) => self.pools.string_ref(s),
            Value::Colour(c) => self.pools.colours.index_of(c),
            Value::Vector(v) => self.pools.vectors.index_of(v),
            Value::Quaternion(q) => self.pools.quaternions.index_of(q),
            Value::Figure(f) => self.pools.figures.index_of(f),
            Value::Compound(_) => Err(Error::InvalidValue("object values cannot be keyframed".to_string())),
        }
    }
}
