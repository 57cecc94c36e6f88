//! XUR header, count header and section table structures.

use zerocopy::byteorder::{BigEndian, U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{Error, Result};

/// XUR wire version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum XurVersion {
    V5 = 5,
    V8 = 8,
}

impl XurVersion {
    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            5 => Ok(Self::V5),
            8 => Ok(Self::V8),
            _ => Err(Error::UnsupportedVersion(value)),
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Check if floats, colours, keyframes and named frames live in their own sections.
    pub fn has_extended_pools(self) -> bool {
        self == Self::V8
    }
}

/// File header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct XurHeader {
    pub magic: [u8; 4],
    pub version: U32<BigEndian>,
    pub flags: U32<BigEndian>,
    pub tool_version: U16<BigEndian>,
    pub file_size: U32<BigEndian>,
    pub section_count: U16<BigEndian>,
}

impl XurHeader {
    /// The magic bytes at the start of a XUR file.
    pub const MAGIC: &'static [u8; 4] = b"XUIB";

    /// Size of the header in bytes.
    pub const SIZE: usize = 20;

    /// Flag bit: a count header follows the header.
    pub const FLAG_COUNT_HEADER: u32 = 0x1;

    /// Check if a count header follows.
    ///
    /// Version 5 always carries one.
    pub fn has_count_header(&self) -> bool {
        self.version.get() == XurVersion::V5.as_u32() || self.flags.get() & Self::FLAG_COUNT_HEADER != 0
    }
}

/// Structural counts stored after the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct CountHeader {
    pub object_count: U32<BigEndian>,
    pub property_count: U32<BigEndian>,
    pub property_array_count: U32<BigEndian>,
    pub keyframe_property_count: U32<BigEndian>,
    pub keyframe_property_depth: U32<BigEndian>,
    pub keyframe_property_def_count: U32<BigEndian>,
    pub keyframe_count: U32<BigEndian>,
    pub timeline_count: U32<BigEndian>,
    pub named_frame_count: U32<BigEndian>,
    pub objects_with_children: U32<BigEndian>,
}

impl CountHeader {
    /// Size of the count header in bytes.
    pub const SIZE: usize = 40;
}

/// Section table entry.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct SectionEntry {
    pub magic: [u8; 4],
    /// Absolute offset of the payload.
    pub offset: U32<BigEndian>,
    pub length: U32<BigEndian>,
}

impl SectionEntry {
    /// Size of a table entry in bytes.
    pub const SIZE: usize = 12;

    pub fn new(kind: SectionKind, offset: u32, length: u32) -> Self {
        Self {
            magic: *kind.magic(),
            offset: U32::new(offset),
            length: U32::new(length),
        }
    }

    /// Magic as text, for diagnostics.
    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.magic).into_owned()
    }
}

/// Section types, in the order the writer emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// UTF-16 string pool.
    Strings,
    /// Vector pool.
    Vectors,
    /// Quaternion pool.
    Quaternions,
    /// Figure pool.
    Figures,
    /// Float pool (v8).
    Floats,
    /// Colour pool (v8).
    Colours,
    /// Keyframe value references (v8).
    KeyframeValues,
    /// Keyframe records (v8).
    Keyframes,
    /// Named-frame records (v8).
    NamedFrames,
    /// Object tree.
    Data,
}

impl SectionKind {
    pub const ALL: [SectionKind; 10] = [
        Self::Strings,
        Self::Vectors,
        Self::Quaternions,
        Self::Figures,
        Self::Floats,
        Self::Colours,
        Self::KeyframeValues,
        Self::Keyframes,
        Self::NamedFrames,
        Self::Data,
    ];

    pub fn magic(self) -> &'static [u8; 4] {
        match self {
            Self::Strings => b"STRN",
            Self::Vectors => b"VECT",
            Self::Quaternions => b"QUAT",
            Self::Figures => b"CUST",
            Self::Floats => b"FLOT",
            Self::Colours => b"COLR",
            Self::KeyframeValues => b"KEYP",
            Self::Keyframes => b"KEYD",
            Self::NamedFrames => b"NAMD",
            Self::Data => b"DATA",
        }
    }

    pub fn from_magic(magic: &[u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.magic() == magic)
    }

    /// Check if the section may appear in a file of `version`.
    pub fn allowed_in(self, version: XurVersion) -> bool {
        match self {
            Self::Strings | Self::Vectors | Self::Quaternions | Self::Figures | Self::Data => true,
            Self::Floats | Self::Colours | Self::KeyframeValues | Self::Keyframes | Self::NamedFrames => {
                version.has_extended_pools()
            }
        }
    }

    /// Check if the section must be written even when empty.
    pub fn is_required(self) -> bool {
        matches!(self, Self::Strings | Self::Data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_sizes() {
        assert_eq!(std::mem::size_of::<XurHeader>(), XurHeader::SIZE);
        assert_eq!(std::mem::size_of::<CountHeader>(), CountHeader::SIZE);
        assert_eq!(std::mem::size_of::<SectionEntry>(), SectionEntry::SIZE);
    }

    #[test]
    fn test_header_is_big_endian() {
        let header = XurHeader {
            magic: *XurHeader::MAGIC,
            version: U32::new(8),
            flags: U32::new(XurHeader::FLAG_COUNT_HEADER),
            tool_version: U16::new(0x000C),
            file_size: U32::new(0x0102),
            section_count: U16::new(2),
        };
        let bytes = header.as_bytes();
        assert_eq!(&bytes[..8], b"XUIB\0\0\0\x08");
        assert_eq!(&bytes[12..14], &[0x00, 0x0C]);
        assert!(header.has_count_header());
    }

    #[test]
    fn test_section_kinds() {
        assert_eq!(SectionKind::from_magic(b"NAMD"), Some(SectionKind::NamedFrames));
        assert_eq!(SectionKind::from_magic(b"ABCD"), None);
        assert!(!SectionKind::Floats.allowed_in(XurVersion::V5));
        assert!(SectionKind::Figures.allowed_in(XurVersion::V5));
    }
}
