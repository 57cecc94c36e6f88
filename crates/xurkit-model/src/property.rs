//! Typed properties.

use std::sync::Arc;

use xurkit_schema::{PropertyDefinition, PropertyType};

use crate::{Error, PropertyValue, Result, Value};

/// A property instance: a shared definition plus a value of the declared type.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    definition: Arc<PropertyDefinition>,
    value: PropertyValue,
}

impl Property {
    /// Build a property, checking the value against the definition.
    ///
    /// The value shape must follow the indexed flag, indexed values need at
    /// least one stop, every value must be of the declared type, and compound
    /// members must be declared by the definition.
    pub fn new(definition: Arc<PropertyDefinition>, value: PropertyValue) -> Result<Self> {
        if definition.is_indexed() != value.is_indexed() {
            return Err(Error::IndexMismatch {
                property: definition.name.clone(),
                indexed: definition.is_indexed(),
            });
        }

        if value.is_indexed() && value.values().is_empty() {
            return Err(Error::EmptyIndexed(definition.name.clone()));
        }

        for v in value.values() {
            check_value(&definition, v)?;
        }

        Ok(Self { definition, value })
    }

    /// Build a non-indexed property.
    pub fn single(definition: Arc<PropertyDefinition>, value: Value) -> Result<Self> {
        Self::new(definition, PropertyValue::Single(value))
    }

    pub fn definition(&self) -> &Arc<PropertyDefinition> {
        &self.definition
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// All values, one per stop for indexed properties.
    pub fn values(&self) -> &[Value] {
        self.value.values()
    }

    /// The value of a non-indexed property.
    pub fn single_value(&self) -> Option<&Value> {
        match &self.value {
            PropertyValue::Single(v) => Some(v),
            PropertyValue::Indexed(_) => None,
        }
    }

    /// Follow a keyframe property down to its animated leaf.
    ///
    /// Nested members are addressed through compound values holding exactly
    /// one member. Returns the definitions from this property down to the
    /// leaf, together with the leaf value.
    pub fn animation_path(&self) -> Result<(Vec<Arc<PropertyDefinition>>, &Value)> {
        let mut path = vec![Arc::clone(&self.definition)];
        let mut current = self;

        loop {
            let value = current
                .single_value()
                .ok_or_else(|| Error::NotAnimatable(current.name().to_string()))?;

            match value {
                Value::Compound(members) => {
                    let [member] = members.as_slice() else {
                        return Err(Error::InvalidAnimationPath(self.name().to_string()));
                    };
                    path.push(Arc::clone(&member.definition));
                    current = member;
                }
                leaf => {
                    if !current.definition.is_animatable() {
                        return Err(Error::NotAnimatable(current.name().to_string()));
                    }
                    return Ok((path, leaf));
                }
            }
        }
    }

    /// Build a keyframe property from a definition path and a leaf value.
    ///
    /// The inverse of [`Property::animation_path`].
    pub fn from_animation_path(path: &[Arc<PropertyDefinition>], leaf: Value) -> Result<Self> {
        let Some((last, parents)) = path.split_last() else {
            return Err(Error::InvalidAnimationPath(String::new()));
        };

        if last.is_indexed() || last.property_type == PropertyType::Object || !last.is_animatable() {
            return Err(Error::NotAnimatable(last.name.clone()));
        }

        let mut property = Self::single(Arc::clone(last), leaf)?;
        for parent in parents.iter().rev() {
            if parent.is_indexed() {
                return Err(Error::NotAnimatable(parent.name.clone()));
            }
            property = Self::single(Arc::clone(parent), Value::Compound(vec![property]))?;
        }
        Ok(property)
    }

    /// Drop compound members whose definition matches `predicate`, recursively.
    pub fn retain_members(&mut self, predicate: &mut impl FnMut(&PropertyDefinition) -> bool) {
        for value in self.value.values_mut() {
            if let Value::Compound(members) = value {
                members.retain(|m| predicate(&m.definition));
                for member in members.iter_mut() {
                    member.retain_members(predicate);
                }
            }
        }
    }
}

fn check_value(definition: &PropertyDefinition, value: &Value) -> Result<()> {
    if !value.matches(definition.property_type) {
        return Err(Error::TypeMismatch {
            property: definition.name.clone(),
            expected: definition.property_type,
            found: value.kind(),
        });
    }

    if let Value::Compound(members) = value {
        for member in members {
            let declared = definition
                .find_member(member.name())
                .is_some_and(|(_, d)| d.same_declaration(&member.definition));
            if !declared {
                return Err(Error::ForeignMember {
                    property: definition.name.clone(),
                    member: member.name().to_string(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use xurkit_schema::PropertyFlags;

    pub(crate) fn def(name: &str, ty: PropertyType, flags: PropertyFlags) -> Arc<PropertyDefinition> {
        Arc::new(PropertyDefinition {
            id: 0,
            name: name.to_string(),
            property_type: ty,
            flags,
            default: None,
            class_name: "XuiElement".to_string(),
            members: Vec::new(),
        })
    }

    fn fill() -> Arc<PropertyDefinition> {
        let mut fill = (*def("Fill", PropertyType::Object, PropertyFlags::empty())).clone();
        fill.members = vec![
            def("FillColor", PropertyType::Colour, PropertyFlags::empty()),
            def("StopPos", PropertyType::Float, PropertyFlags::INDEXED),
        ];
        Arc::new(fill)
    }

    #[test]
    fn test_type_is_checked() {
        let width = def("Width", PropertyType::Float, PropertyFlags::empty());
        assert!(Property::single(width.clone(), Value::Float(1.0)).is_ok());
        assert!(matches!(
            Property::single(width, Value::Int(1)),
            Err(Error::TypeMismatch { found: "integer", .. })
        ));
    }

    #[test]
    fn test_indexed_shape_is_checked() {
        let stops = def("StopPos", PropertyType::Float, PropertyFlags::INDEXED);
        assert!(matches!(
            Property::single(stops.clone(), Value::Float(0.0)),
            Err(Error::IndexMismatch { indexed: true, .. })
        ));
        let p = Property::new(stops, PropertyValue::Indexed(vec![Value::Float(0.0), Value::Float(1.0)])).unwrap();
        assert_eq!(p.values().len(), 2);
    }

    #[test]
    fn test_empty_indexed_rejected() {
        let stops = def("StopPos", PropertyType::Float, PropertyFlags::INDEXED);
        assert!(matches!(
            Property::new(stops, PropertyValue::Indexed(Vec::new())),
            Err(Error::EmptyIndexed(name)) if name == "StopPos"
        ));
    }

    #[test]
    fn test_foreign_member_rejected() {
        let stray = def("Stray", PropertyType::Colour, PropertyFlags::empty());
        let member = Property::single(stray, Value::Colour(0)).unwrap();
        assert!(matches!(
            Property::single(fill(), Value::Compound(vec![member])),
            Err(Error::ForeignMember { .. })
        ));
    }

    #[test]
    fn test_animation_path_round_trip() {
        let fill = fill();
        let path = vec![fill.clone(), fill.members[0].clone()];
        let property = Property::from_animation_path(&path, Value::Colour(0xFF00FF00)).unwrap();

        let (walked, leaf) = property.animation_path().unwrap();
        assert_eq!(walked.len(), 2);
        assert_eq!(walked[1].name, "FillColor");
        assert_eq!(leaf, &Value::Colour(0xFF00FF00));
    }

    #[test]
    fn test_indexed_leaf_not_animatable() {
        let fill = fill();
        let path = vec![fill.clone(), fill.members[1].clone()];
        assert!(matches!(
            Property::from_animation_path(&path, Value::Float(0.5)),
            Err(Error::NotAnimatable(_))
        ));
    }

    #[test]
    fn test_no_anim_leaf_rejected() {
        let locked = def("Locked", PropertyType::Float, PropertyFlags::NO_ANIM);
        let property = Property::single(locked, Value::Float(1.0)).unwrap();
        assert!(property.animation_path().is_err());
    }
}
