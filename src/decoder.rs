//! Entry decoding over an explicit byte cursor.
//!
//! An entry is read field by field in a fixed order:
//!
//! ```text
//! ExpectOpenBracket -> ReadKeyName -> ExpectSemicolon
//!   -> ReadValueName -> ExpectSemicolon
//!   -> ReadValueType -> ExpectSemicolon
//!   -> ReadValueLength -> ExpectSemicolon
//!   -> ReadValueData -> ExpectCloseBracket -> Done
//! ```
//!
//! Each step takes the cursor by value and hands back the parsed field with
//! the advanced cursor. Nothing else is carried between steps or entries.

use crate::error::{EntryFault, PolicyError, Result};
use crate::integer::decode_integer;
use crate::kind::RegistryValueKind;
use crate::record::PolicyRecord;
use crate::utils::{
    code_unit_at, find_code_unit, read_utf16_string, CLOSE_BRACKET, CODE_UNIT, NUL,
    OPEN_BRACKET, SEMICOLON,
};
use crate::value::{ValueData, DWORD_SIZE, QWORD_SIZE};
use tracing::{debug, trace, warn};

/// Bytes left at the end of a buffer that are not treated as another entry.
///
/// A tail this short cannot hold an entry, so decoding stops instead of
/// reporting it as malformed.
pub const TRAILING_SLACK: usize = CODE_UNIT;

/// Size of the type and length fields.
const INT_FIELD_SIZE: usize = 4;

/// What to do with a payload whose kind has no decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedTypePolicy {
    /// Fail with [`PolicyError::UnsupportedValueType`].
    #[default]
    Reject,
    /// Keep the raw bytes as [`ValueData::Binary`].
    CaptureRaw,
}

/// Decoder settings.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Handling of payloads for kinds without a decoder.
    pub unsupported_types: UnsupportedTypePolicy,
}

impl DecodeOptions {
    /// Creates the default options (unsupported payloads are rejected).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handling of payloads for kinds without a decoder.
    pub fn with_unsupported_types(mut self, policy: UnsupportedTypePolicy) -> Self {
        self.unsupported_types = policy;
        self
    }
}

/// Byte offset of the next unread position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(usize);

impl Cursor {
    /// Creates a cursor at `offset`.
    pub fn new(offset: usize) -> Self {
        Self(offset)
    }

    /// Returns the byte offset.
    pub fn offset(self) -> usize {
        self.0
    }

    fn advance(self, bytes: usize) -> Self {
        Self(self.0 + bytes)
    }
}

/// Decodes entries from a policy file buffer.
pub struct EntryDecoder<'a> {
    data: &'a [u8],
    options: &'a DecodeOptions,
}

impl<'a> EntryDecoder<'a> {
    /// Creates a decoder over the whole file buffer.
    pub fn new(data: &'a [u8], options: &'a DecodeOptions) -> Self {
        Self { data, options }
    }

    /// Returns true if enough bytes remain after `cursor` to read an entry.
    pub fn has_entry_at(&self, cursor: Cursor) -> bool {
        self.data.len().saturating_sub(cursor.offset()) > TRAILING_SLACK
    }

    /// Decodes the entry starting at `cursor`.
    ///
    /// Returns the record and the cursor just past the entry's `]`.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::MalformedEntry`] for layout violations,
    /// [`PolicyError::InvalidValueType`] for unknown type codes,
    /// [`PolicyError::UnsupportedValueType`] for rejected payloads and
    /// [`PolicyError::InvalidUtf16`] for undecodable text.
    pub fn decode_entry(&self, cursor: Cursor) -> Result<(PolicyRecord, Cursor)> {
        let start = cursor;

        let cursor = self.expect_unit(cursor, OPEN_BRACKET, EntryFault::MissingOpenBracket)?;
        let key_cursor = cursor;
        let (key_name, cursor) = self.read_name(cursor)?;
        if key_name.is_empty() {
            return Err(PolicyError::malformed(
                key_cursor.offset(),
                EntryFault::EmptyKeyName,
            ));
        }
        let cursor = self.expect_semicolon(cursor)?;
        let (value_name, cursor) = self.read_name(cursor)?;
        let cursor = self.expect_semicolon(cursor)?;

        let type_cursor = cursor;
        let (code, cursor) = self.read_i32(cursor)?;
        let value_type = RegistryValueKind::from_code(code, type_cursor.offset())?;
        let cursor = self.expect_semicolon(cursor)?;

        let length_cursor = cursor;
        let (length, cursor) = self.read_i32(cursor)?;
        let value_length = u32::try_from(length).map_err(|_| {
            PolicyError::malformed(length_cursor.offset(), EntryFault::NegativeLength)
        })?;
        let cursor = self.expect_semicolon(cursor)?;

        let (value_data, cursor) = self.read_value_data(cursor, value_type, value_length)?;
        let cursor = self.expect_close_bracket(cursor)?;

        debug!(
            offset = %format!("{:#x}", start.offset()),
            key = %key_name,
            value = %value_name,
            kind = %value_type,
            length = value_length,
            "Decoded entry"
        );

        let record =
            PolicyRecord::from_parts(key_name, value_name, value_type, value_length, value_data);
        Ok((record, cursor))
    }

    /// Requires the next code unit to be `unit` and steps past it.
    fn expect_unit(&self, cursor: Cursor, unit: u16, fault: EntryFault) -> Result<Cursor> {
        match code_unit_at(self.data, cursor.offset()) {
            Some(found) if found == unit => Ok(cursor.advance(CODE_UNIT)),
            _ => Err(PolicyError::malformed(cursor.offset(), fault)),
        }
    }

    fn expect_semicolon(&self, cursor: Cursor) -> Result<Cursor> {
        self.expect_unit(cursor, SEMICOLON, EntryFault::MissingSemicolon)
    }

    /// Reads a NUL-terminated name up to (not including) the next `;`.
    fn read_name(&self, cursor: Cursor) -> Result<(String, Cursor)> {
        let semicolon = find_code_unit(self.data, cursor.offset(), SEMICOLON).ok_or_else(|| {
            PolicyError::malformed(cursor.offset(), EntryFault::MissingSemicolon)
        })?;

        let span = &self.data[cursor.offset()..semicolon];
        let body_len = span.len().checked_sub(CODE_UNIT).ok_or_else(|| {
            PolicyError::malformed(semicolon, EntryFault::MissingNullTerminator)
        })?;
        if code_unit_at(span, body_len) != Some(NUL) {
            return Err(PolicyError::malformed(
                semicolon,
                EntryFault::MissingNullTerminator,
            ));
        }

        let name = read_utf16_string(&span[..body_len], cursor.offset())?;
        trace!(offset = cursor.offset(), name = %name, "Read name field");
        Ok((name, Cursor::new(semicolon)))
    }

    /// Reads a little-endian signed 32-bit field.
    fn read_i32(&self, cursor: Cursor) -> Result<(i32, Cursor)> {
        let bytes = self.take(cursor, INT_FIELD_SIZE)?;
        let value = decode_integer(bytes)?.as_i64() as i32;
        Ok((value, cursor.advance(INT_FIELD_SIZE)))
    }

    /// Reads the data field, if the entry declares one.
    fn read_value_data(
        &self,
        cursor: Cursor,
        kind: RegistryValueKind,
        length: u32,
    ) -> Result<(ValueData, Cursor)> {
        if length == 0 {
            return Ok((ValueData::None, cursor));
        }

        let declared = length as usize;
        let size = match kind {
            RegistryValueKind::String
            | RegistryValueKind::ExpandString
            | RegistryValueKind::MultiString
            | RegistryValueKind::Binary => declared,

            RegistryValueKind::Dword => DWORD_SIZE,

            RegistryValueKind::Qword => QWORD_SIZE,

            RegistryValueKind::None
            | RegistryValueKind::DwordBigEndian
            | RegistryValueKind::Link
            | RegistryValueKind::ResourceList
            | RegistryValueKind::FullResourceDescriptor
            | RegistryValueKind::ResourceRequirementsList => {
                return self.read_unsupported(cursor, kind, declared);
            }
        };

        let bytes = self.take(cursor, size)?;
        let data = ValueData::decode(bytes, kind, cursor.offset())?;
        Ok((data, cursor.advance(size)))
    }

    /// Consumes the declared bytes of a kind without a decoder.
    fn read_unsupported(
        &self,
        cursor: Cursor,
        kind: RegistryValueKind,
        length: usize,
    ) -> Result<(ValueData, Cursor)> {
        let bytes = self.take(cursor, length)?;

        match self.options.unsupported_types {
            UnsupportedTypePolicy::Reject => Err(PolicyError::UnsupportedValueType {
                kind,
                offset: cursor.offset(),
            }),
            UnsupportedTypePolicy::CaptureRaw => {
                warn!(
                    offset = %format!("{:#x}", cursor.offset()),
                    kind = %kind,
                    length,
                    "Capturing raw payload of unsupported value type"
                );
                Ok((ValueData::Binary(bytes.to_vec()), cursor.advance(length)))
            }
        }
    }

    /// Scans for the next `]` and steps past it.
    fn expect_close_bracket(&self, cursor: Cursor) -> Result<Cursor> {
        find_code_unit(self.data, cursor.offset(), CLOSE_BRACKET)
            .map(|offset| Cursor::new(offset + CODE_UNIT))
            .ok_or_else(|| {
                PolicyError::malformed(cursor.offset(), EntryFault::MissingCloseBracket)
            })
    }

    /// Returns the next `size` bytes without advancing.
    fn take(&self, cursor: Cursor, size: usize) -> Result<&'a [u8]> {
        let data: &'a [u8] = self.data;
        cursor
            .offset()
            .checked_add(size)
            .and_then(|end| data.get(cursor.offset()..end))
            .ok_or_else(|| PolicyError::malformed(cursor.offset(), EntryFault::Truncated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{write_code_unit, write_utf16};

    fn name_field(out: &mut Vec<u8>, name: &str) {
        write_utf16(out, name);
        write_code_unit(out, NUL);
        write_code_unit(out, SEMICOLON);
    }

    fn raw_entry(key: &str, value: &str, code: i32, length: i32, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        write_code_unit(&mut out, OPEN_BRACKET);
        name_field(&mut out, key);
        name_field(&mut out, value);
        out.extend_from_slice(&code.to_le_bytes());
        write_code_unit(&mut out, SEMICOLON);
        out.extend_from_slice(&length.to_le_bytes());
        write_code_unit(&mut out, SEMICOLON);
        out.extend_from_slice(data);
        write_code_unit(&mut out, CLOSE_BRACKET);
        out
    }

    fn decode_one(bytes: &[u8], options: &DecodeOptions) -> Result<(PolicyRecord, Cursor)> {
        EntryDecoder::new(bytes, options).decode_entry(Cursor::new(0))
    }

    #[test]
    fn test_dword_entry() {
        let bytes = raw_entry("Key", "Val", 4, 4, &[0x2A, 0, 0, 0]);
        let (record, cursor) = decode_one(&bytes, &DecodeOptions::default()).unwrap();

        assert_eq!(record.key_name(), "Key");
        assert_eq!(record.value_name(), "Val");
        assert_eq!(record.value_type(), RegistryValueKind::Dword);
        assert_eq!(record.value_data(), &ValueData::Dword(42));
        assert_eq!(cursor.offset(), bytes.len());
    }

    #[test]
    fn test_dword_ignores_declared_length() {
        // Declared 2 bytes, but a DWORD always occupies 4.
        let bytes = raw_entry("Key", "Val", 4, 2, &[1, 0, 0, 0]);
        let (record, _) = decode_one(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(record.value_data(), &ValueData::Dword(1));
        assert_eq!(record.value_length(), 2);
    }

    #[test]
    fn test_missing_open_bracket() {
        let bytes = raw_entry("Key", "Val", 0, 0, &[]);
        let err = decode_one(&bytes[2..], &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { offset: 0, fault: EntryFault::MissingOpenBracket }
        ));
    }

    #[test]
    fn test_missing_null_terminator() {
        let mut bytes = Vec::new();
        write_code_unit(&mut bytes, OPEN_BRACKET);
        write_utf16(&mut bytes, "Key");
        write_code_unit(&mut bytes, SEMICOLON);

        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { offset: 8, fault: EntryFault::MissingNullTerminator }
        ));
    }

    #[test]
    fn test_missing_semicolon() {
        let mut bytes = Vec::new();
        write_code_unit(&mut bytes, OPEN_BRACKET);
        write_utf16(&mut bytes, "Key\0");

        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { fault: EntryFault::MissingSemicolon, .. }
        ));
    }

    #[test]
    fn test_missing_close_bracket() {
        let mut bytes = raw_entry("Key", "Val", 0, 0, &[]);
        bytes.truncate(bytes.len() - CODE_UNIT);

        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { fault: EntryFault::MissingCloseBracket, .. }
        ));
    }

    #[test]
    fn test_truncated_data() {
        let mut bytes = raw_entry("Key", "Val", 3, 16, &[1, 2, 3]);
        bytes.truncate(bytes.len() - CODE_UNIT);

        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { fault: EntryFault::Truncated, .. }
        ));
    }

    #[test]
    fn test_negative_length() {
        let bytes = raw_entry("Key", "Val", 3, -1, &[]);
        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { fault: EntryFault::NegativeLength, .. }
        ));
    }

    #[test]
    fn test_invalid_type_code() {
        let bytes = raw_entry("Key", "Val", 99, 0, &[]);
        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, PolicyError::InvalidValueType { code: 99, .. }));
    }

    #[test]
    fn test_unsupported_rejected_by_default() {
        let bytes = raw_entry("Key", "Val", 5, 4, &[0, 0, 0, 1]);
        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::UnsupportedValueType { kind: RegistryValueKind::DwordBigEndian, .. }
        ));
    }

    #[test]
    fn test_unsupported_captured_raw() {
        let options =
            DecodeOptions::new().with_unsupported_types(UnsupportedTypePolicy::CaptureRaw);
        let bytes = raw_entry("Key", "Val", 6, 4, &[1, 2, 3, 4]);

        let (record, cursor) = decode_one(&bytes, &options).unwrap();
        assert_eq!(record.value_type(), RegistryValueKind::Link);
        assert_eq!(record.value_data(), &ValueData::Binary(vec![1, 2, 3, 4]));
        assert_eq!(cursor.offset(), bytes.len());
    }

    #[test]
    fn test_unsupported_without_payload_is_fine() {
        let bytes = raw_entry("Key", "Val", 0, 0, &[]);
        let (record, _) = decode_one(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(record.value_type(), RegistryValueKind::None);
        assert_eq!(record.value_data(), &ValueData::None);
    }

    #[test]
    fn test_empty_key_name() {
        let bytes = raw_entry("", "Val", 4, 4, &[1, 0, 0, 0]);
        let err = decode_one(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            PolicyError::MalformedEntry { offset: 2, fault: EntryFault::EmptyKeyName }
        ));
    }

    #[test]
    fn test_empty_value_name() {
        let bytes = raw_entry("Key", "", 0, 0, &[]);
        let (record, _) = decode_one(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(record.value_name(), "");
    }

    #[test]
    fn test_has_entry_at_boundary() {
        let options = DecodeOptions::default();
        let data = [0u8; 10];
        let decoder = EntryDecoder::new(&data, &options);

        assert!(decoder.has_entry_at(Cursor::new(10 - TRAILING_SLACK - 1)));
        assert!(!decoder.has_entry_at(Cursor::new(10 - TRAILING_SLACK)));
        assert!(!decoder.has_entry_at(Cursor::new(10)));
        assert!(!decoder.has_entry_at(Cursor::new(12)));
    }
}
