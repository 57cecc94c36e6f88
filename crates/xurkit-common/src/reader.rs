//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that efficiently
//! reads big-endian binary data from a byte slice without copying.

use byteorder::{BigEndian, ByteOrder};
use zerocopy::FromBytes;

use crate::packed;
use crate::{Error, Result};

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// All multi-byte scalars are big-endian, matching the XUR wire format.
///
/// # Example
///
/// ```
/// use xurkit_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0xF1, 0x23];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x01020304);
/// assert_eq!(reader.read_packed().unwrap(), 0x123);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Create a new reader starting at a specific position.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    /// Read a boolean (non-zero = true).
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read_u8().map(|b| b != 0)
    }

    /// Read a big-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    /// Read a big-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    /// Read a big-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(BigEndian::read_i32)
    }

    /// Read a big-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(BigEndian::read_f32)
    }

    /// Read a packed unsigned integer.
    #[inline]
    pub fn read_packed(&mut self) -> Result<u32> {
        let (value, consumed) = packed::decode_packed(self.remaining_bytes())?;
        self.position += consumed;
        Ok(value)
    }

    /// Read a packed unsigned integer as a `usize` index or count.
    #[inline]
    pub fn read_packed_usize(&mut self) -> Result<usize> {
        self.read_packed().map(|v| v as usize)
    }

    /// Read a string stored as a u16 character count followed by UTF-16BE units.
    pub fn read_utf16_prefixed(&mut self) -> Result<String> {
        let count = self.read_u16()? as usize;
        let bytes = self.read_bytes(count * 2)?;
        let units = bytes.chunks_exact(2).map(BigEndian::read_u16);
        char::decode_utf16(units)
            .collect::<std::result::Result<String, _>>()
            .map_err(Error::Utf16)
    }

    /// Read an ASCII string from a fixed-size field, stopping at the first null.
    pub fn read_fixed_ascii(&mut self, length: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(length)?;
        let end = memchr::memchr(0, bytes).unwrap_or(length);
        let text = &bytes[..end];
        if let Some(&b) = text.iter().find(|b| !b.is_ascii()) {
            return Err(Error::NonAscii(b));
        }
        std::str::from_utf8(text).map_err(Error::Utf8)
    }

    /// Read a null-terminated UTF-8 string.
    pub fn read_cstr(&mut self) -> Result<&'a str> {
        let remaining = self.remaining_bytes();
        let null_pos = memchr::memchr(0, remaining).ok_or(Error::MissingNullTerminator)?;

        let bytes = &remaining[..null_pos];
        self.position += null_pos + 1;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }

    /// Read a struct using zerocopy.
    ///
    /// The struct must implement `FromBytes` from the zerocopy crate.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x01020304
            0xFF, 0xFF, 0xFF, 0xFE, // i32: -2
            0x80, // i8: -128
            0x3F, 0x80, 0x00, 0x00, // f32: 1.0
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x01020304);
        assert_eq!(reader.read_i32().unwrap(), -2);
        assert_eq!(reader.read_i8().unwrap(), -128);
        assert_eq!(reader.read_f32().unwrap(), 1.0);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_read_utf16_prefixed() {
        let data = [0x00, 0x02, 0x00, b'h', 0x00, b'i'];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_utf16_prefixed().unwrap(), "hi");
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_read_cstr() {
        let data = b"XUIB\0scene\0tail";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_cstr().unwrap(), "XUIB");
        assert_eq!(reader.read_cstr().unwrap(), "scene");
        assert!(matches!(reader.read_cstr(), Err(Error::MissingNullTerminator)));
        assert_eq!(reader.position(), 11);
    }

    #[test]
    fn test_read_fixed_ascii() {
        let data = b"DATA\0\0\0\0\xC3\xA9";
        let mut reader = BinaryReader::new(data);

        assert_eq!(reader.read_fixed_ascii(8).unwrap(), "DATA");
        assert_eq!(reader.position(), 8);
        assert!(matches!(reader.read_fixed_ascii(2), Err(Error::NonAscii(0xC3))));
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::UnexpectedEof { needed: 4, available: 2 })
        ));
    }
}
