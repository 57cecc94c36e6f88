//! Packed variable-length unsigned integers.
//!
//! Layout:
//!
//! | Value range        | Bytes | Encoding                                   |
//! |--------------------|-------|--------------------------------------------|
//! | `0x000..=0x0EF`    | 1     | the value itself                           |
//! | `0x0F0..=0xEFF`    | 2     | `0xF0 \| (v >> 8)`, then `v & 0xFF`        |
//! | everything else    | 5     | `0xFF`, then the value as a big-endian u32 |

use crate::{Error, Result};

/// Lead byte that introduces a full 32-bit value.
const WIDE_MARKER: u8 = 0xFF;

/// First lead byte of the two-byte form.
const SHORT_BASE: u8 = 0xF0;

/// Largest value that fits in the two-byte form.
pub const MAX_SHORT: u32 = 0xEFF;

/// Number of bytes `value` occupies once packed.
#[inline]
pub const fn packed_len(value: u32) -> usize {
    if value < SHORT_BASE as u32 {
        1
    } else if value <= MAX_SHORT {
        2
    } else {
        5
    }
}

/// Append the packed form of `value` to `out`.
pub fn encode_packed(value: u32, out: &mut Vec<u8>) {
    if value < SHORT_BASE as u32 {
        out.push(value as u8);
    } else if value <= MAX_SHORT {
        out.push(SHORT_BASE | (value >> 8) as u8);
        out.push((value & 0xFF) as u8);
    } else {
        out.push(WIDE_MARKER);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

/// Decode a packed value from the start of `data`.
///
/// Returns the value together with the number of bytes consumed.
pub fn decode_packed(data: &[u8]) -> Result<(u32, usize)> {
    let lead = *data.first().ok_or(Error::UnexpectedEof {
        needed: 1,
        available: 0,
    })?;

    if lead < SHORT_BASE {
        return Ok((lead as u32, 1));
    }

    if lead == WIDE_MARKER {
        let bytes = data.get(1..5).ok_or(Error::UnexpectedEof {
            needed: 5,
            available: data.len(),
        })?;
        let value = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        return Ok((value, 5));
    }

    let low = *data.get(1).ok_or(Error::UnexpectedEof {
        needed: 2,
        available: data.len(),
    })?;
    Ok((((lead & 0x0F) as u32) << 8 | low as u32, 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_values() {
        for (value, len) in [(0u32, 1usize), (0xEF, 1), (0xF0, 2), (0xFFF, 5), (0x10000, 5)] {
            let mut out = Vec::new();
            encode_packed(value, &mut out);
            assert_eq!(out.len(), len, "encoded length of {value:#x}");
            assert_eq!(packed_len(value), len);
            assert_eq!(decode_packed(&out).unwrap(), (value, len));
        }
    }

    #[test]
    fn test_two_byte_layout() {
        let mut out = Vec::new();
        encode_packed(0xEFF, &mut out);
        assert_eq!(out, [0xFE, 0xFF]);

        encode_packed(0xF0, &mut out);
        assert_eq!(&out[2..], [0xF0, 0xF0]);
    }

    #[test]
    fn test_wide_layout() {
        let mut out = Vec::new();
        encode_packed(0xDEADBEEF, &mut out);
        assert_eq!(out, [0xFF, 0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_truncated_input() {
        assert!(decode_packed(&[]).is_err());
        assert!(decode_packed(&[0xF3]).is_err());
        assert!(decode_packed(&[0xFF, 0x00, 0x01]).is_err());
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        assert_eq!(decode_packed(&[0x05, 0xAA, 0xBB]).unwrap(), (5, 1));
    }
}
