//! Pool building.
//!
//! Before any section is encoded, one depth-first walk of the tree collects
//! every pooled value: object properties, compound members, every stop of
//! indexed properties, and the properties of every keyframe of every
//! timeline. Strings additionally come from class names, timeline targets and
//! named frames.

use xurkit_model::{Figure, Property, Quat, UIObject, Value, Vec3};

use crate::pool::Pool;
use crate::{Result, XurVersion};

/// Every value pool of one XUR file.
#[derive(Debug, Default)]
pub struct ValuePools {
    pub strings: Pool<String>,
    pub vectors: Pool<Vec3>,
    pub quaternions: Pool<Quat>,
    pub figures: Pool<Figure>,
    /// Only filled for version 8; version 5 stores floats inline.
    pub floats: Pool<f32>,
    /// Only filled for version 8; version 5 stores colours inline.
    pub colours: Pool<u32>,
    extended: bool,
}

impl ValuePools {
    /// Collect the pools of a tree.
    pub fn collect(root: &UIObject, version: XurVersion) -> Result<Self> {
        let mut pools = Self {
            extended: version.has_extended_pools(),
            ..Self::default()
        };
        pools.collect_object(root)?;
        Ok(pools)
    }

    /// Reference to a string: zero for the empty string, entry index plus one otherwise.
    pub fn string_ref(&self, s: &str) -> Result<u32> {
        if s.is_empty() {
            return Ok(0);
        }
        Ok(self.strings.index_of(&s.to_string())? + 1)
    }

    fn add_string(&mut self, s: &str) -> Result<()> {
        if !s.is_empty() {
            self.strings.insert(&s.to_string())?;
        }
        Ok(())
    }

    fn collect_object(&mut self, object: &UIObject) -> Result<()> {
        self.add_string(&object.class_name)?;
        for property in &object.properties {
            self.collect_property(property)?;
        }

        for child in &object.children {
            self.collect_object(child)?;
        }

        for frame in &object.named_frames {
            self.add_string(&frame.name)?;
            if let Some(target) = &frame.target {
                self.add_string(target)?;
            }
        }
        for timeline in &object.timelines {
            self.add_string(&timeline.target)?;
            for keyframe in &timeline.keyframes {
                for property in &keyframe.properties {
                    self.collect_property(property)?;
                }
            }
        }
        Ok(())
    }

    fn collect_property(&mut self, property: &Property) -> Result<()> {
        for value in property.values() {
            match value {
                Value::String(s) => self.add_string(s)?,
                Value::Vector(v) => {
                    self.vectors.insert(v)?;
                }
                Value::Quaternion(q) => {
                    self.quaternions.insert(q)?;
                }
                Value::Figure(f) => {
                    self.figures.insert(f)?;
                }
                Value::Float(f) if self.extended => {
                    self.floats.insert(f)?;
                }
                Value::Colour(c) if self.extended => {
                    self.colours.insert(c)?;
                }
                Value::Compound(members) => {
                    for member in members {
                        self.collect_property(member)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_tree;

    #[test]
    fn test_v8_pools_cover_keyframes() {
        let pools = ValuePools::collect(&sample_tree(), XurVersion::V8).unwrap();
        // Two fill colours on the keyframes plus the object's own fill colour.
        assert_eq!(pools.colours.len(), 3);
        assert!(pools.string_ref("Box").unwrap() > 0);
        assert_eq!(pools.string_ref("").unwrap(), 0);
        assert!(!pools.floats.is_empty());
    }

    #[test]
    fn test_v5_keeps_floats_inline() {
        let pools = ValuePools::collect(&sample_tree(), XurVersion::V5).unwrap();
        assert!(pools.floats.is_empty());
        assert!(pools.colours.is_empty());
        assert_eq!(pools.vectors.len(), 1);
    }
}
