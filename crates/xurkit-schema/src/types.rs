//! Declared property types and flags.

use bitflags::bitflags;

use crate::{Error, Result};

/// Declared type of a property definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    /// Boolean value.
    Bool,
    /// Signed 32-bit integer.
    Integer,
    /// Unsigned 32-bit integer.
    Unsigned,
    /// 32-bit floating point.
    Float,
    /// Text.
    String,
    /// 32-bit ARGB colour.
    Colour,
    /// Three-component vector.
    Vector,
    /// Four-component rotation.
    Quaternion,
    /// Nested property list described by the definition's members.
    Object,
    /// Figure shape (bounding box and bezier points).
    Custom,
}

impl PropertyType {
    /// Parse a type name as it appears in schema files.
    pub fn parse(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(Self::Bool),
            "integer" | "int" => Ok(Self::Integer),
            "unsigned" | "uint" => Ok(Self::Unsigned),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "colour" | "color" => Ok(Self::Colour),
            "vector" => Ok(Self::Vector),
            "quaternion" => Ok(Self::Quaternion),
            "object" => Ok(Self::Object),
            "custom" => Ok(Self::Custom),
            _ => Err(Error::UnknownType(name.to_string())),
        }
    }

    /// Get the schema name for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Unsigned => "unsigned",
            Self::Float => "float",
            Self::String => "string",
            Self::Colour => "colour",
            Self::Vector => "vector",
            Self::Quaternion => "quaternion",
            Self::Object => "object",
            Self::Custom => "custom",
        }
    }

    /// Check if values of this type live in a deduplicated pool in XUR files.
    pub fn is_pooled(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Float | Self::Colour | Self::Vector | Self::Quaternion | Self::Custom
        )
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

bitflags! {
    /// Per-definition property flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u32 {
        /// Value is a list with one entry per stop.
        const INDEXED = 0x01;
        /// Not shown in authoring tools.
        const HIDDEN = 0x02;
        /// String is a localisation key.
        const LOCALIZED = 0x04;
        /// Property cannot be animated by timelines.
        const NO_ANIM = 0x08;
        /// String is a file path.
        const FILEPATH = 0x10;
    }
}

impl PropertyFlags {
    /// Parse a flag list such as `"indexed|noanim"`.
    ///
    /// Entries may be separated by `|`, `,` or whitespace.
    pub fn parse(list: &str) -> Result<Self> {
        let mut flags = Self::empty();
        for token in list
            .split(|c: char| c == '|' || c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            flags |= match token.to_ascii_lowercase().as_str() {
                "indexed" => Self::INDEXED,
                "hidden" => Self::HIDDEN,
                "localized" | "localised" => Self::LOCALIZED,
                "noanim" | "no-anim" | "noanimation" => Self::NO_ANIM,
                "filepath" => Self::FILEPATH,
                _ => return Err(Error::UnknownFlag(token.to_string())),
            };
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_type_aliases() {
        assert_eq!(PropertyType::parse("Color").unwrap(), PropertyType::Colour);
        assert_eq!(PropertyType::parse("uint").unwrap(), PropertyType::Unsigned);
        assert!(PropertyType::parse("matrix").is_err());
    }

    #[test]
    fn test_parse_flags() {
        let flags = PropertyFlags::parse("indexed| noanim ,filepath").unwrap();
        assert_eq!(
            flags,
            PropertyFlags::INDEXED | PropertyFlags::NO_ANIM | PropertyFlags::FILEPATH
        );
        assert_eq!(PropertyFlags::parse("").unwrap(), PropertyFlags::empty());
        assert!(PropertyFlags::parse("sparkly").is_err());
    }
}
