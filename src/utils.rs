//! Utility functions for binary parsing and UTF-16 text conversion.
//!
//! All text in a policy file is UTF-16LE, so delimiters are matched as whole
//! 2-byte code units aligned to the position where a scan starts.

use crate::error::{PolicyError, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use encoding_rs::UTF_16LE;
use std::io::Cursor;

/// Size of one UTF-16 code unit in bytes.
pub const CODE_UNIT: usize = 2;

/// `[` opening an entry.
pub const OPEN_BRACKET: u16 = b'[' as u16;

/// `]` closing an entry.
pub const CLOSE_BRACKET: u16 = b']' as u16;

/// `;` separating entry fields.
pub const SEMICOLON: u16 = b';' as u16;

/// NUL terminating names and strings.
pub const NUL: u16 = 0;

/// Reads an ASCII string from a byte slice, trimming null terminators.
///
/// Uses lossy conversion to handle any invalid UTF-8 bytes gracefully.
pub fn read_ascii_string(data: &[u8]) -> String {
    String::from_utf8_lossy(data)
        .trim_end_matches('\0')
        .to_string()
}

/// Decodes UTF-16LE bytes verbatim.
///
/// Unlike registry name fields, nothing is trimmed here: callers decide
/// which terminators belong to the format. A leading byte-order mark is kept
/// as text.
///
/// # Errors
///
/// Returns an error if the data length is odd or the data is not valid
/// UTF-16 (for example an unpaired surrogate).
pub fn read_utf16_string(data: &[u8], offset: usize) -> Result<String> {
    if data.is_empty() {
        return Ok(String::new());
    }

    // UTF-16 requires even number of bytes
    if data.len() % CODE_UNIT != 0 {
        return Err(PolicyError::InvalidUtf16 { offset });
    }

    let (decoded, had_errors) = UTF_16LE.decode_without_bom_handling(data);

    if had_errors {
        return Err(PolicyError::InvalidUtf16 { offset });
    }

    Ok(decoded.into_owned())
}

/// Appends `text` to `out` as UTF-16LE code units.
pub fn write_utf16(out: &mut Vec<u8>, text: &str) {
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
}

/// Appends a single UTF-16LE code unit to `out`.
pub fn write_code_unit(out: &mut Vec<u8>, unit: u16) {
    out.extend_from_slice(&unit.to_le_bytes());
}

/// Returns the code unit starting at `offset`, if two bytes remain.
pub fn code_unit_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(CODE_UNIT)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Finds the first occurrence of `unit` at or after `from`, stepping by whole
/// code units. Returns its byte offset.
pub fn find_code_unit(data: &[u8], from: usize, unit: u16) -> Option<usize> {
    let tail = data.get(from..)?;
    tail.chunks_exact(CODE_UNIT)
        .position(|pair| u16::from_le_bytes([pair[0], pair[1]]) == unit)
        .map(|index| from + index * CODE_UNIT)
}

/// Reads a u32 from a byte slice at the given offset.
pub fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(PolicyError::TruncatedData {
            offset,
            expected: 4,
            actual: data.len().saturating_sub(offset),
        });
    }

    let mut cursor = Cursor::new(&data[offset..offset + 4]);
    Ok(cursor.read_u32::<LittleEndian>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_ascii_string() {
        assert_eq!(read_ascii_string(b"PReg"), "PReg");
        assert_eq!(read_ascii_string(b"Hello\0\0"), "Hello");
    }

    #[test]
    fn test_utf16_roundtrip_keeps_nuls() {
        let mut bytes = Vec::new();
        write_utf16(&mut bytes, "Hi\0");
        assert_eq!(bytes, [b'H', 0, b'i', 0, 0, 0]);
        assert_eq!(read_utf16_string(&bytes, 0).unwrap(), "Hi\0");
    }

    #[test]
    fn test_utf16_odd_length() {
        let err = read_utf16_string(&[0x41, 0x00, 0x42], 7).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidUtf16 { offset: 7 }));
    }

    #[test]
    fn test_utf16_lone_surrogate() {
        let err = read_utf16_string(&[0x00, 0xD8], 0).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidUtf16 { .. }));
    }

    #[test]
    fn test_utf16_bom_is_text() {
        let decoded = read_utf16_string(&[0xFF, 0xFE, b'a', 0], 0).unwrap();
        assert_eq!(decoded, "\u{FEFF}a");
    }

    #[test]
    fn test_find_code_unit_is_aligned() {
        // ';' as a high byte of "\u{3B00}" must not match at an odd offset.
        let data = [0x00, 0x3B, 0x00, 0x3B, 0x00];
        assert_eq!(find_code_unit(&data, 0, SEMICOLON), None);
        assert_eq!(find_code_unit(&data, 1, SEMICOLON), Some(1));
        assert_eq!(find_code_unit(&data, 9, SEMICOLON), None);
    }

    #[test]
    fn test_code_unit_at() {
        let data = [b'[', 0, b'x'];
        assert_eq!(code_unit_at(&data, 0), Some(OPEN_BRACKET));
        assert_eq!(code_unit_at(&data, 2), None);
    }

    #[test]
    fn test_read_u32_le() {
        let data = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(read_u32_le(&data, 0).unwrap(), 0x04030201);
        assert!(read_u32_le(&data, 1).is_err());
    }
}
