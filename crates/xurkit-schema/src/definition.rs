//! Class and property definition types.

use std::sync::Arc;

use crate::{PropertyFlags, PropertyType};

/// Definition of a typed property declared by a class.
///
/// Definitions are immutable once their schema file is registered and are
/// shared through `Arc` by every property instance that uses them.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Numeric id, unique within the declaring list.
    pub id: u32,
    /// Property name.
    pub name: String,
    /// Declared value type.
    pub property_type: PropertyType,
    /// Flag set.
    pub flags: PropertyFlags,
    /// Default value in its XUI text form.
    pub default: Option<String>,
    /// Name of the class that declares this property.
    pub class_name: String,
    /// Nested definitions of an `object` property.
    pub members: Vec<Arc<PropertyDefinition>>,
}

impl PropertyDefinition {
    /// Check if the value is a per-stop list.
    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.flags.contains(PropertyFlags::INDEXED)
    }

    /// Check if timelines may animate this property.
    #[inline]
    pub fn is_animatable(&self) -> bool {
        !self.flags.contains(PropertyFlags::NO_ANIM)
    }

    /// Check if both definitions come from the same declaration.
    pub fn same_declaration(&self, other: &PropertyDefinition) -> bool {
        self.class_name == other.class_name && self.name == other.name && self.id == other.id
    }

    /// Find a member of an `object` property by name.
    pub fn find_member(&self, name: &str) -> Option<(usize, &Arc<PropertyDefinition>)> {
        self.members.iter().enumerate().find(|(_, m)| m.name == name)
    }
}

/// A class: a named list of property definitions with an optional base class.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Class name.
    pub name: String,
    /// Base class name, `None` for hierarchy roots.
    pub base: Option<String>,
    /// Properties declared directly on this class.
    pub properties: Vec<Arc<PropertyDefinition>>,
}

impl Class {
    /// Find a directly declared property by name.
    pub fn find_property(&self, name: &str) -> Option<(usize, &Arc<PropertyDefinition>)> {
        self.properties.iter().enumerate().find(|(_, p)| p.name == name)
    }

    /// Check if this class has no base class.
    pub fn is_root(&self) -> bool {
        self.base.is_none()
    }
}
