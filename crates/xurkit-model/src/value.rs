//! Typed property values.

use glam::{Quat, Vec2, Vec3};
use xurkit_schema::PropertyType;

use crate::Property;

/// Default figure bounding box when the owning object has no size.
pub const DEFAULT_FIGURE_SIZE: Vec2 = Vec2::new(60.0, 30.0);

/// A property value; the variant always matches the declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `integer`
    Int(i32),
    /// `unsigned`
    UInt(u32),
    /// `float`
    Float(f32),
    /// `string`
    String(String),
    /// `colour`, packed ARGB.
    Colour(u32),
    /// `vector`
    Vector(Vec3),
    /// `quaternion`
    Quaternion(Quat),
    /// `object`: the nested member properties that are set.
    Compound(Vec<Property>),
    /// `custom`
    Figure(Figure),
}

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::UInt(_) => "unsigned",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Colour(_) => "colour",
            Self::Vector(_) => "vector",
            Self::Quaternion(_) => "quaternion",
            Self::Compound(_) => "object",
            Self::Figure(_) => "custom",
        }
    }

    /// Check if the variant is the one used for `ty`.
    pub fn matches(&self, ty: PropertyType) -> bool {
        matches!(
            (self, ty),
            (Self::Bool(_), PropertyType::Bool)
                | (Self::Int(_), PropertyType::Integer)
                | (Self::UInt(_), PropertyType::Unsigned)
                | (Self::Float(_), PropertyType::Float)
                | (Self::String(_), PropertyType::String)
                | (Self::Colour(_), PropertyType::Colour)
                | (Self::Vector(_), PropertyType::Vector)
                | (Self::Quaternion(_), PropertyType::Quaternion)
                | (Self::Compound(_), PropertyType::Object)
                | (Self::Figure(_), PropertyType::Custom)
        )
    }

    /// The zero value of a type.
    pub fn zero(ty: PropertyType) -> Self {
        match ty {
            PropertyType::Bool => Self::Bool(false),
            PropertyType::Integer => Self::Int(0),
            PropertyType::Unsigned => Self::UInt(0),
            PropertyType::Float => Self::Float(0.0),
            PropertyType::String => Self::String(String::new()),
            PropertyType::Colour => Self::Colour(0),
            PropertyType::Vector => Self::Vector(Vec3::ZERO),
            PropertyType::Quaternion => Self::Quaternion(Quat::IDENTITY),
            PropertyType::Object => Self::Compound(Vec::new()),
            PropertyType::Custom => Self::Figure(Figure::default()),
        }
    }

    /// Get the float payload.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the string payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the members of a compound value.
    pub fn as_compound(&self) -> Option<&[Property]> {
        match self {
            Self::Compound(members) => Some(members),
            _ => None,
        }
    }
}

/// Value of a property: one value, or one per stop for indexed definitions.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Single(Value),
    Indexed(Vec<Value>),
}

impl PropertyValue {
    /// All values, one for single properties.
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Indexed(values) => values,
        }
    }

    /// Mutable access to all values.
    pub fn values_mut(&mut self) -> &mut [Value] {
        match self {
            Self::Single(value) => std::slice::from_mut(value),
            Self::Indexed(values) => values,
        }
    }

    /// Check if this is the per-stop form.
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed(_))
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        Self::Single(value)
    }
}

/// A bezier point of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BezierPoint {
    pub point: Vec2,
    pub ctrl1: Vec2,
    pub ctrl2: Vec2,
    /// Smoothing mode byte.
    pub smoothing: u8,
}

/// A vector shape: bounding box and closed bezier outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// Width and height of the bounding box.
    pub bounds: Vec2,
    pub points: Vec<BezierPoint>,
}

impl Default for Figure {
    fn default() -> Self {
        Self {
            bounds: DEFAULT_FIGURE_SIZE,
            points: Vec::new(),
        }
    }
}

/// Colour helpers for packed ARGB values.
pub mod colour {
    /// Pack channels into ARGB.
    pub fn from_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
        u32::from_be_bytes([a, r, g, b])
    }

    /// Unpack ARGB into `[a, r, g, b]`.
    pub fn to_argb(colour: u32) -> [u8; 4] {
        colour.to_be_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_matches_type() {
        for ty in [
            PropertyType::Bool,
            PropertyType::Integer,
            PropertyType::Unsigned,
            PropertyType::Float,
            PropertyType::String,
            PropertyType::Colour,
            PropertyType::Vector,
            PropertyType::Quaternion,
            PropertyType::Object,
            PropertyType::Custom,
        ] {
            assert!(Value::zero(ty).matches(ty), "{ty}");
        }
        assert!(!Value::Int(1).matches(PropertyType::Unsigned));
    }

    #[test]
    fn test_values_slice() {
        let single = PropertyValue::Single(Value::Int(3));
        assert_eq!(single.values(), &[Value::Int(3)]);
        let indexed = PropertyValue::Indexed(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(indexed.values().len(), 2);
        assert!(indexed.is_indexed());
    }

    #[test]
    fn test_colour_channels() {
        let c = colour::from_argb(0xFF, 0x10, 0x20, 0x30);
        assert_eq!(c, 0xFF102030);
        assert_eq!(colour::to_argb(c), [0xFF, 0x10, 0x20, 0x30]);
    }
}
