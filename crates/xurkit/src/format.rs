//! File format detection.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use xurkit_xur::{XurHeader, XurVersion};

use crate::{Error, Result};

/// Bytes inspected when sniffing a file.
const SNIFF_LEN: u64 = 512;

/// A document format the converter reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Xui,
    Xur5,
    Xur8,
}

impl FileFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xui => "xui",
            Self::Xur5 | Self::Xur8 => "xur",
        }
    }

    /// Wire version for the binary formats.
    pub fn xur_version(self) -> Option<XurVersion> {
        match self {
            Self::Xui => None,
            Self::Xur5 => Some(XurVersion::V5),
            Self::Xur8 => Some(XurVersion::V8),
        }
    }

    fn from_xur_version(version: XurVersion) -> Self {
        match version {
            XurVersion::V5 => Self::Xur5,
            XurVersion::V8 => Self::Xur8,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Xui => "xui",
            Self::Xur5 => "xur5",
            Self::Xur8 => "xur8",
        })
    }
}

impl FromStr for FileFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xui" => Ok(Self::Xui),
            "xur5" | "5" => Ok(Self::Xur5),
            "xur8" | "xur" | "8" => Ok(Self::Xur8),
            _ => Err(Error::UnknownFormatName(s.to_string())),
        }
    }
}

/// Check if a path has a `.xui` or `.xur` extension.
pub fn is_convertible(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xui") || e.eq_ignore_ascii_case("xur"))
}

/// Detect the format of a file.
///
/// A `XUIB` signature selects XUR by its version field. Otherwise a `.xui`
/// extension or a leading `<` selects XUI.
pub fn detect_format(path: impl AsRef<Path>) -> Result<FileFormat> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }

    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

    if head.starts_with(XurHeader::MAGIC) && head.len() >= 8 {
        let version = u32::from_be_bytes([head[4], head[5], head[6], head[7]]);
        return Ok(FileFormat::from_xur_version(XurVersion::from_u32(version)?));
    }

    let has_xui_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xui"));
    if has_xui_extension || looks_like_xml(&head) {
        return Ok(FileFormat::Xui);
    }

    Err(Error::UnknownFormat(path.to_path_buf()))
}

fn looks_like_xml(head: &[u8]) -> bool {
    let head = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    head.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'<')
}
