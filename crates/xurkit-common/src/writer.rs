//! Binary writer, the inverse of [`BinaryReader`](crate::BinaryReader).

use zerocopy::{Immutable, IntoBytes};

use crate::packed;
use crate::{Error, Result};

/// Growable big-endian output buffer.
///
/// Writes into a `Vec<u8>` cannot fail, so scalar writes are infallible; only
/// the string helpers that enforce format limits return a `Result`.
#[derive(Debug, Default, Clone)]
pub struct BinaryWriter {
    buffer: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with reserved capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been written.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// View the written bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consume the writer and return its buffer.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }

    /// Append raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(value as u8);
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a packed unsigned integer.
    #[inline]
    pub fn write_packed(&mut self, value: u32) {
        packed::encode_packed(value, &mut self.buffer);
    }

    /// Write a `usize` index or count as a packed unsigned integer.
    #[inline]
    pub fn write_packed_usize(&mut self, value: usize) {
        self.write_packed(value as u32);
    }

    /// Write a u16 character count followed by UTF-16BE code units.
    pub fn write_utf16_prefixed(&mut self, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        let count = u16::try_from(units.len()).map_err(|_| Error::StringTooLong(units.len()))?;
        self.write_u16(count);
        for unit in units {
            self.write_u16(unit);
        }
        Ok(())
    }

    /// Write an ASCII string into a fixed-size field, padding with nulls.
    pub fn write_fixed_ascii(&mut self, value: &str, length: usize) -> Result<()> {
        if let Some(&b) = value.as_bytes().iter().find(|b| !b.is_ascii()) {
            return Err(Error::NonAscii(b));
        }
        if value.len() > length {
            return Err(Error::FieldOverflow {
                len: value.len(),
                capacity: length,
            });
        }
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.resize(self.buffer.len() + length - value.len(), 0);
        Ok(())
    }

    /// Write a UTF-8 string followed by a null terminator.
    pub fn write_cstr(&mut self, value: &str) -> Result<()> {
        if memchr::memchr(0, value.as_bytes()).is_some() {
            return Err(Error::InteriorNul);
        }
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
        Ok(())
    }

    /// Write a struct using zerocopy.
    #[inline]
    pub fn write_struct<T: IntoBytes + Immutable>(&mut self, value: &T) {
        self.write_bytes(value.as_bytes());
    }
}
