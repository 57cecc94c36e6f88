//! XUR reader.
//!
//! Reading runs as a fixed sequence of states: header, optional count
//! header, section table, then each section in table order. Every section is
//! read through a reader clamped to its declared extent and must end exactly
//! at `offset + length`. The object tree is verified against the count
//! header once all sections are read.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use xurkit_common::BinaryReader;
use xurkit_model::{
    AnimationPath, ClassLayout, Command, Figure, Interpolation, Keyframe, NamedFrame, Property, PropertyValue,
    Quat, Timeline, UIObject, Value, Vec3, MAX_DEPTH,
};
use xurkit_schema::{PropertyDefinition, PropertyType, SchemaGroup};

use crate::pool::{lookup, read_entries};
use crate::records::{read_records, run, KeyframeRecord, NamedFrameRecord};
use crate::{
    CountHeader, Error, Result, SectionEntry, SectionKind, StructureCounts, XurHeader, XurVersion,
    OBJECT_HAS_CHILDREN, OBJECT_HAS_PROPERTIES, OBJECT_HAS_TIMELINES,
};

/// A decoded XUR file.
#[derive(Debug, Clone, PartialEq)]
pub struct XurDocument {
    pub version: XurVersion,
    pub tool_version: u16,
    /// Counts stored in the file, when it has a count header.
    pub counts: Option<StructureCounts>,
    pub root: UIObject,
}

/// Reads XUR files, resolving classes and properties through a schema group.
pub struct XurReader<'g> {
    group: &'g SchemaGroup,
}

impl<'g> XurReader<'g> {
    pub fn new(group: &'g SchemaGroup) -> Self {
        Self { group }
    }

    /// Read a XUR file from disk.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<XurDocument> {
        let data = std::fs::read(path)?;
        self.read(&data)
    }

    /// Decode a XUR file.
    pub fn read(&self, data: &[u8]) -> Result<XurDocument> {
        let mut reader = BinaryReader::new(data);

        let header: XurHeader = reader.read_struct()?;
        if &header.magic != XurHeader::MAGIC {
            return Err(Error::InvalidMagic(header.magic));
        }
        let version = XurVersion::from_u32(header.version.get())?;
        if header.file_size.get() as usize != data.len() {
            return Err(Error::FileSizeMismatch {
                header: header.file_size.get(),
                actual: data.len(),
            });
        }

        let stored = if header.has_count_header() {
            let counts: CountHeader = reader.read_struct()?;
            Some(StructureCounts::from(&counts))
        } else {
            None
        };

        let entries = (0..header.section_count.get())
            .map(|_| reader.read_struct::<SectionEntry>())
            .collect::<xurkit_common::Result<Vec<_>>>()?;

        let mut decoder = Decoder::new(self.group, version);
        let mut seen: Vec<SectionKind> = Vec::with_capacity(entries.len());

        for entry in &entries {
            let kind = SectionKind::from_magic(&entry.magic)
                .filter(|kind| kind.allowed_in(version))
                .ok_or_else(|| Error::UnexpectedSection {
                    magic: entry.name(),
                    version: version.as_u32(),
                })?;
            if seen.contains(&kind) {
                return Err(Error::DuplicateSection(entry.name()));
            }
            if seen.contains(&SectionKind::Data) {
                return Err(Error::SectionAfterData(entry.name()));
            }
            seen.push(kind);

            let offset = entry.offset.get() as usize;
            let end = offset
                .checked_add(entry.length.get() as usize)
                .filter(|end| *end <= data.len())
                .ok_or_else(|| Error::SectionOutOfBounds {
                    magic: entry.name(),
                    offset: entry.offset.get(),
                    length: entry.length.get(),
                    file_size: data.len(),
                })?;

            let mut section = BinaryReader::new_at(&data[..end], offset);
            decoder.read_section(kind, &mut section)?;

            if section.position() != end {
                return Err(Error::SectionDesync {
                    magic: entry.name(),
                    expected: end,
                    actual: section.position(),
                });
            }
            debug!("read section {} ({} bytes)", entry.name(), entry.length.get());
        }

        let root = decoder.root.ok_or(Error::MissingSection("DATA"))?;

        if let Some(stored) = &stored {
            StructureCounts::from_tree(&root)?.verify(stored)?;
        }

        Ok(XurDocument {
            version,
            tool_version: header.tool_version.get(),
            counts: stored,
            root,
        })
    }
}

/// Pools and tables read so far, and the object tree once `DATA` is read.
struct Decoder<'g> {
    group: &'g SchemaGroup,
    version: XurVersion,
    strings: Vec<String>,
    vectors: Vec<Vec3>,
    quaternions: Vec<Quat>,
    figures: Vec<Figure>,
    floats: Vec<f32>,
    colours: Vec<u32>,
    keyframe_values: Vec<u32>,
    keyframes: Vec<KeyframeRecord>,
    named_frames: Vec<NamedFrameRecord>,
    root: Option<UIObject>,
}

impl<'g> Decoder<'g> {
    fn new(group: &'g SchemaGroup, version: XurVersion) -> Self {
        Self {
            group,
            version,
            strings: Vec::new(),
            vectors: Vec::new(),
            quaternions: Vec::new(),
            figures: Vec::new(),
            floats: Vec::new(),
            colours: Vec::new(),
            keyframe_values: Vec::new(),
            keyframes: Vec::new(),
            named_frames: Vec::new(),
            root: None,
        }
    }

    fn read_section(&mut self, kind: SectionKind, r: &mut BinaryReader<'_>) -> Result<()> {
        match kind {
            SectionKind::Strings => self.strings = read_entries(r)?,
            SectionKind::Vectors => self.vectors = read_entries(r)?,
            SectionKind::Quaternions => self.quaternions = read_entries(r)?,
            SectionKind::Figures => self.figures = read_entries(r)?,
            SectionKind::Floats => self.floats = read_entries(r)?,
            SectionKind::Colours => self.colours = read_entries(r)?,
            SectionKind::KeyframeValues => {
                self.keyframe_values = read_records(r, |r| Ok(r.read_packed()?))?;
            }
            SectionKind::Keyframes => self.keyframes = read_records(r, KeyframeRecord::read)?,
            SectionKind::NamedFrames => self.named_frames = read_records(r, NamedFrameRecord::read)?,
            SectionKind::Data => self.root = Some(self.read_object(r, 1)?),
        }
        Ok(())
    }

    /// Resolve a string reference; zero is the empty string.
    fn string(&self, reference: u32) -> Result<&str> {
        match reference {
            0 => Ok(""),
            n => lookup(&self.strings, n - 1).map(String::as_str).map_err(|_| Error::PoolIndex {
                pool: "string",
                index: n,
                len: self.strings.len(),
            }),
        }
    }

    fn read_object(&self, r: &mut BinaryReader<'_>, depth: usize) -> Result<UIObject> {
        if depth > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        let class_name = self.string(r.read_packed()?)?.to_string();
        let flags = r.read_u8()?;
        let mut object = UIObject::new(class_name);

        if flags & OBJECT_HAS_PROPERTIES != 0 {
            let layout = ClassLayout::resolve(self.group, &object.class_name)?;
            let count = r.read_packed_usize()?;
            for _ in 0..count {
                let depth = r.read_packed()?;
                let index = r.read_packed()?;
                let definition = layout
                    .get(depth as usize, index as usize)
                    .cloned()
                    .ok_or_else(|| Error::UnresolvedProperty {
                        class: object.class_name.clone(),
                        depth,
                        index,
                    })?;
                let value = self.read_property_value(r, &definition)?;
                object.properties.push(Property::new(definition, value)?);
            }
        }

        if flags & OBJECT_HAS_CHILDREN != 0 {
            let count = r.read_packed_usize()?;
            for _ in 0..count {
                let child = self.read_object(r, depth + 1)?;
                object.children.push(child);
            }
        }

        if flags & OBJECT_HAS_TIMELINES != 0 {
            self.read_animation(r, &mut object)?;
        }

        Ok(object)
    }

    fn read_property_value(&self, r: &mut BinaryReader<'_>, definition: &Arc<PropertyDefinition>) -> Result<PropertyValue> {
        if definition.is_indexed() {
            let count = r.read_packed_usize()?;
            let values = (0..count)
                .map(|_| self.read_value(r, definition))
                .collect::<Result<Vec<_>>>()?;
            Ok(PropertyValue::Indexed(values))
        } else {
            Ok(PropertyValue::Single(self.read_value(r, definition)?))
        }
    }

    fn read_value(&self, r: &mut BinaryReader<'_>, definition: &Arc<PropertyDefinition>) -> Result<Value> {
        let extended = self.version.has_extended_pools();
        let value = match definition.property_type {
            PropertyType::Bool => Value::Bool(r.read_bool()?),
            PropertyType::Integer => Value::Int(r.read_i32()?),
            PropertyType::Unsigned => Value::UInt(r.read_packed()?),
            PropertyType::Float if extended => Value::Float(*lookup(&self.floats, r.read_packed()?)?),
            PropertyType::Float => Value::Float(r.read_f32()?),
            PropertyType::String => Value::String(self.string(r.read_packed()?)?.to_string()),
            PropertyType::Colour if extended => Value::Colour(*lookup(&self.colours, r.read_packed()?)?),
            PropertyType::Colour => Value::Colour(r.read_u32()?),
            PropertyType::Vector => Value::Vector(*lookup(&self.vectors, r.read_packed()?)?),
            PropertyType::Quaternion => Value::Quaternion(*lookup(&self.quaternions, r.read_packed()?)?),
            PropertyType::Custom => Value::Figure(lookup(&self.figures, r.read_packed()?)?.clone()),
            PropertyType::Object => {
                let count = r.read_packed_usize()?;
                let mut members = Vec::new();
                for _ in 0..count {
                    let depth = r.read_packed()?;
                    let index = r.read_packed()?;
                    let member = definition
                        .members
                        .get(index as usize)
                        .filter(|_| depth == 0)
                        .cloned()
                        .ok_or_else(|| Error::UnresolvedProperty {
                            class: definition.name.clone(),
                            depth,
                            index,
                        })?;
                    let value = self.read_property_value(r, &member)?;
                    members.push(Property::new(member, value)?);
                }
                Value::Compound(members)
            }
        };
        Ok(value)
    }

    fn read_animation(&self, r: &mut BinaryReader<'_>, object: &mut UIObject) -> Result<()> {
        let records = match self.version {
            XurVersion::V5 => {
                let count = r.read_packed_usize()?;
                (0..count)
                    .map(|_| NamedFrameRecord::read(r))
                    .collect::<Result<Vec<_>>>()?
            }
            XurVersion::V8 => {
                let base = r.read_packed()?;
                let count = r.read_packed_usize()?;
                if count == 0 {
                    Vec::new()
                } else {
                    run(&self.named_frames, "named frame", base, count)?.to_vec()
                }
            }
        };

        for record in records {
            let target = match record.target {
                0 => None,
                reference => Some(self.string(reference)?.to_string()),
            };
            object.named_frames.push(NamedFrame::new(
                self.string(record.name)?,
                record.frame,
                Command::from_u8(record.command)?,
                target,
            )?);
        }

        let count = r.read_packed_usize()?;
        let mut timelines = Vec::new();
        for _ in 0..count {
            timelines.push(self.read_timeline(r, object)?);
        }
        object.timelines = timelines;
        Ok(())
    }

    fn read_timeline(&self, r: &mut BinaryReader<'_>, object: &UIObject) -> Result<Timeline> {
        let target_id = self.string(r.read_packed()?)?;
        let target = object
            .find_child_by_id(target_id)
            .ok_or_else(|| Error::UnknownTimelineTarget(target_id.to_string()))?;
        let layout = ClassLayout::resolve(self.group, &target.class_name)?;

        let path_count = r.read_packed_usize()?;
        let mut paths: Vec<AnimationPath> = Vec::new();
        for _ in 0..path_count {
            paths.push(read_path(r, &layout, &target.class_name)?);
        }

        let mut timeline = Timeline::new(target_id);
        match self.version {
            XurVersion::V5 => {
                let count = r.read_packed_usize()?;
                for _ in 0..count {
                    let mut keyframe = Keyframe {
                        frame: r.read_u32()?,
                        interpolation: Interpolation::from_u8(r.read_u8()?)?,
                        ease_in: r.read_i8()?,
                        ease_out: r.read_i8()?,
                        ease_scale: r.read_i8()?,
                        properties: Vec::with_capacity(paths.len()),
                    };
                    for path in &paths {
                        let value = self.read_value(r, leaf(path)?)?;
                        keyframe.properties.push(Property::from_animation_path(path, value)?);
                    }
                    timeline.keyframes.push(keyframe);
                }
            }
            XurVersion::V8 => {
                let base = r.read_packed()?;
                let count = r.read_packed_usize()?;
                let records = if count == 0 {
                    &[][..]
                } else {
                    run(&self.keyframes, "keyframe", base, count)?
                };
                for record in records {
                    let references = if paths.is_empty() {
                        &[][..]
                    } else {
                        run(&self.keyframe_values, "keyframe value", record.first_value, paths.len())?
                    };
                    let mut keyframe = Keyframe {
                        frame: record.frame,
                        interpolation: Interpolation::from_u8(record.interpolation)?,
                        ease_in: record.ease_in as i8,
                        ease_out: record.ease_out as i8,
                        ease_scale: record.ease_scale as i8,
                        properties: Vec::with_capacity(paths.len()),
                    };
                    for (path, &reference) in paths.iter().zip(references) {
                        let value = self.keyframe_value(leaf(path)?, reference)?;
                        keyframe.properties.push(Property::from_animation_path(path, value)?);
                    }
                    timeline.keyframes.push(keyframe);
                }
            }
        }

        Ok(timeline)
    }

    /// Resolve a `KEYP` reference for an animated leaf.
    fn keyframe_value(&self, definition: &PropertyDefinition, reference: u32) -> Result<Value> {
        let value = match definition.property_type {
            PropertyType::Bool => Value::Bool(reference != 0),
            PropertyType::Integer => Value::Int(reference as i32),
            PropertyType::Unsigned => Value::UInt(reference),
            PropertyType::Float => Value::Float(*lookup(&self.floats, reference)?),
            PropertyType::String => Value::String(self.string(reference)?.to_string()),
            PropertyType::Colour => Value::Colour(*lookup(&self.colours, reference)?),
            PropertyType::Vector => Value::Vector(*lookup(&self.vectors, reference)?),
            PropertyType::Quaternion => Value::Quaternion(*lookup(&self.quaternions, reference)?),
            PropertyType::Custom => Value::Figure(lookup(&self.figures, reference)?.clone()),
            PropertyType::Object => return Err(xurkit_model::Error::NotAnimatable(definition.name.clone()).into()),
        };
        Ok(value)
    }
}

/// Read one timeline path: a top-level `(depth, index)` then nested member indices.
fn read_path(r: &mut BinaryReader<'_>, layout: &ClassLayout, class_name: &str) -> Result<AnimationPath> {
    let components = r.read_packed_usize()?;
    let mut path: AnimationPath = Vec::new();

    for position in 0..components {
        let depth = r.read_packed()?;
        let index = r.read_packed()?;
        let definition = if position == 0 {
            layout.get(depth as usize, index as usize).cloned()
        } else {
            path.last()
                .and_then(|parent| parent.members.get(index as usize))
                .filter(|_| depth == 0)
                .cloned()
        };
        let definition = definition.ok_or_else(|| Error::UnresolvedProperty {
            class: class_name.to_string(),
            depth,
            index,
        })?;
        path.push(definition);
    }

    if path.is_empty() {
        return Err(Error::InvalidValue("empty timeline path".to_string()));
    }
    Ok(path)
}

/// The animated leaf of a path, which must be a plain non-object value.
fn leaf(path: &AnimationPath) -> Result<&Arc<PropertyDefinition>> {
    let leaf = path
        .last()
        .ok_or_else(|| Error::InvalidValue("empty timeline path".to_string()))?;
    if leaf.property_type == PropertyType::Object || leaf.is_indexed() || !leaf.is_animatable() {
        return Err(xurkit_model::Error::NotAnimatable(leaf.name.clone()).into());
    }
    Ok(leaf)
}
