//! Little-endian integer decoding with width chosen by input length.

use crate::error::{PolicyError, Result};

/// Largest byte sequence the integer decoder accepts.
pub const MAX_INTEGER_BYTES: usize = 8;

/// Inputs up to this many bytes decode as 32-bit.
const DWORD_BYTES: usize = 4;

/// A decoded signed integer, 32-bit or 64-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integer {
    /// Decoded from at most 4 bytes.
    I32(i32),
    /// Decoded from 5 to 8 bytes.
    I64(i64),
}

impl Integer {
    /// Widens the value to 64 bits.
    pub fn as_i64(self) -> i64 {
        match self {
            Integer::I32(v) => i64::from(v),
            Integer::I64(v) => v,
        }
    }
}

/// Decodes a little-endian byte sequence into a signed integer.
///
/// Up to 4 bytes produce [`Integer::I32`], 5 to 8 bytes produce
/// [`Integer::I64`]. Short inputs are zero-extended, so `[0xFF; 4]` is `-1`
/// while `[0xFF; 3]` is `0x00FF_FFFF`.
///
/// # Errors
///
/// Returns [`PolicyError::InvalidIntegerSize`] for inputs longer than 8 bytes.
pub fn decode_integer(bytes: &[u8]) -> Result<Integer> {
    if bytes.len() > MAX_INTEGER_BYTES {
        return Err(PolicyError::InvalidIntegerSize(bytes.len()));
    }

    // Walk from the most significant byte down to byte 0.
    let acc = bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

    if bytes.len() <= DWORD_BYTES {
        Ok(Integer::I32(acc as u32 as i32))
    } else {
        Ok(Integer::I64(acc as i64))
    }
}
