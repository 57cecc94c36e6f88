//! Structural counts of an object tree.

use xurkit_model::{Property, UIObject, Value};
use zerocopy::byteorder::U32;

use crate::{CountHeader, Error, Result};

/// The ten structural counts recorded in a XUR count header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructureCounts {
    /// Objects, including the root.
    pub object_count: u32,
    /// Object properties and, recursively, compound members.
    pub property_count: u32,
    /// Non-empty property lists: object lists and compound values.
    pub property_array_count: u32,
    /// Animated properties summed over all keyframes.
    pub keyframe_property_count: u32,
    /// Path components summed over all timeline paths.
    pub keyframe_property_depth: u32,
    /// Timeline paths summed over all timelines.
    pub keyframe_property_def_count: u32,
    pub keyframe_count: u32,
    pub timeline_count: u32,
    pub named_frame_count: u32,
    pub objects_with_children: u32,
}

impl StructureCounts {
    /// Walk a tree and count everything.
    pub fn from_tree(root: &UIObject) -> Result<Self> {
        let mut counts = Self::default();

        for object in root.descendants() {
            counts.object_count += 1;
            if !object.children.is_empty() {
                counts.objects_with_children += 1;
            }
            if !object.properties.is_empty() {
                counts.property_array_count += 1;
            }
            for property in &object.properties {
                counts.add_property(property);
            }

            counts.named_frame_count += len_u32(object.named_frames.len())?;
            counts.timeline_count += len_u32(object.timelines.len())?;

            for timeline in &object.timelines {
                let paths = timeline.paths()?;
                let path_count = len_u32(paths.len())?;
                let keyframe_count = len_u32(timeline.keyframes.len())?;

                counts.keyframe_property_def_count += path_count;
                for path in &paths {
                    counts.keyframe_property_depth += len_u32(path.len())?;
                }
                counts.keyframe_count += keyframe_count;
                counts.keyframe_property_count += keyframe_count * path_count;
            }
        }

        Ok(counts)
    }

    fn add_property(&mut self, property: &Property) {
        self.property_count += 1;
        for value in property.values() {
            if let Value::Compound(members) = value {
                if !members.is_empty() {
                    self.property_array_count += 1;
                }
                for member in members {
                    self.add_property(member);
                }
            }
        }
    }

    /// Fields paired with their names, in header order.
    pub fn fields(&self) -> [(&'static str, u32); 10] {
        [
            ("object_count", self.object_count),
            ("property_count", self.property_count),
            ("property_array_count", self.property_array_count),
            ("keyframe_property_count", self.keyframe_property_count),
            ("keyframe_property_depth", self.keyframe_property_depth),
            ("keyframe_property_def_count", self.keyframe_property_def_count),
            ("keyframe_count", self.keyframe_count),
            ("timeline_count", self.timeline_count),
            ("named_frame_count", self.named_frame_count),
            ("objects_with_children", self.objects_with_children),
        ]
    }

    /// Compare against stored counts; the first differing field is an error.
    pub fn verify(&self, stored: &StructureCounts) -> Result<()> {
        for ((field, computed), (_, stored)) in self.fields().into_iter().zip(stored.fields()) {
            if computed != stored {
                return Err(Error::CountMismatch {
                    field,
                    stored,
                    computed,
                });
            }
        }
        Ok(())
    }
}

impl From<&CountHeader> for StructureCounts {
    fn from(header: &CountHeader) -> Self {
        Self {
            object_count: header.object_count.get(),
            property_count: header.property_count.get(),
            property_array_count: header.property_array_count.get(),
            keyframe_property_count: header.keyframe_property_count.get(),
            keyframe_property_depth: header.keyframe_property_depth.get(),
            keyframe_property_def_count: header.keyframe_property_def_count.get(),
            keyframe_count: header.keyframe_count.get(),
            timeline_count: header.timeline_count.get(),
            named_frame_count: header.named_frame_count.get(),
            objects_with_children: header.objects_with_children.get(),
        }
    }
}

impl From<&StructureCounts> for CountHeader {
    fn from(counts: &StructureCounts) -> Self {
        Self {
            object_count: U32::new(counts.object_count),
            property_count: U32::new(counts.property_count),
            property_array_count: U32::new(counts.property_array_count),
            keyframe_property_count: U32::new(counts.keyframe_property_count),
            keyframe_property_depth: U32::new(counts.keyframe_property_depth),
            keyframe_property_def_count: U32::new(counts.keyframe_property_def_count),
            keyframe_count: U32::new(counts.keyframe_count),
            timeline_count: U32::new(counts.timeline_count),
            named_frame_count: U32::new(counts.named_frame_count),
            objects_with_children: U32::new(counts.objects_with_children),
        }
    }
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::Overflow("list length"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_tree;

    #[test]
    fn test_counts_of_sample_tree() {
        let counts = StructureCounts::from_tree(&sample_tree()).unwrap();
        assert_eq!(counts.object_count, 3);
        assert_eq!(counts.objects_with_children, 1);
        assert_eq!(counts.timeline_count, 1);
        assert_eq!(counts.keyframe_count, 2);
        assert_eq!(counts.keyframe_property_def_count, 2);
        assert_eq!(counts.keyframe_property_depth, 3);
        assert_eq!(counts.keyframe_property_count, 4);
        assert_eq!(counts.named_frame_count, 2);
    }

    #[test]
    fn test_header_conversion_and_verify() {
        let counts = StructureCounts::from_tree(&sample_tree()).unwrap();
        let header = CountHeader::from(&counts);
        let back = StructureCounts::from(&header);
        assert!(counts.verify(&back).is_ok());

        let mut corrupt = back;
        corrupt.property_count += 1;
        assert!(matches!(
            counts.verify(&corrupt),
            Err(Error::CountMismatch { field: "property_count", .. })
        ));
    }
}
