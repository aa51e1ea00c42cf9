//! Registry value payloads and their per-kind wire encoding.

use crate::error::{PolicyError, Result};
use crate::integer::decode_integer;
use crate::kind::RegistryValueKind;
use crate::multi_string::split_multi_string;
use crate::utils::{read_utf16_string, write_code_unit, write_utf16, NUL};
use byteorder::{LittleEndian, WriteBytesExt};
use std::fmt;

/// Size of a `REG_DWORD` payload.
pub const DWORD_SIZE: usize = 4;

/// Size of a `REG_QWORD` payload.
pub const QWORD_SIZE: usize = 8;

/// Parsed registry value data.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueData {
    /// No data.
    None,

    /// String value (`REG_SZ` or `REG_EXPAND_SZ`).
    String(String),

    /// Multiple strings.
    MultiString(Vec<String>),

    /// Binary data, also used for raw payloads of kinds without a decoder.
    Binary(Vec<u8>),

    /// 32-bit integer.
    Dword(i32),

    /// 64-bit integer.
    Qword(i64),
}

impl ValueData {
    /// Decodes a payload according to its value kind.
    ///
    /// `data` must already be cut to the payload: the declared length for
    /// string and binary kinds, 4 bytes for `REG_DWORD`, 8 for `REG_QWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if string data is not valid UTF-16, integer data is
    /// short, or a non-empty payload is given for a kind without a decoder.
    pub fn decode(data: &[u8], kind: RegistryValueKind, offset: usize) -> Result<Self> {
        if data.is_empty() {
            return Ok(ValueData::None);
        }

        match kind {
            RegistryValueKind::String | RegistryValueKind::ExpandString => {
                let text = read_utf16_string(data, offset)?;
                let text = text.strip_suffix('\0').unwrap_or(&text);
                Ok(ValueData::String(text.to_string()))
            }

            RegistryValueKind::MultiString => {
                let text = read_utf16_string(data, offset)?;
                // A well-formed list ends with an extra NUL after the last item's.
                let text = if text.ends_with("\0\0") {
                    &text[..text.len() - 1]
                } else {
                    text.as_str()
                };
                Ok(ValueData::MultiString(split_multi_string(text)))
            }

            RegistryValueKind::Binary => Ok(ValueData::Binary(data.to_vec())),

            RegistryValueKind::Dword => {
                let bytes = fixed(data, DWORD_SIZE, offset)?;
                Ok(ValueData::Dword(decode_integer(bytes)?.as_i64() as i32))
            }

            RegistryValueKind::Qword => {
                let bytes = fixed(data, QWORD_SIZE, offset)?;
                Ok(ValueData::Qword(decode_integer(bytes)?.as_i64()))
            }

            RegistryValueKind::None
            | RegistryValueKind::DwordBigEndian
            | RegistryValueKind::Link
            | RegistryValueKind::ResourceList
            | RegistryValueKind::FullResourceDescriptor
            | RegistryValueKind::ResourceRequirementsList => {
                Err(PolicyError::UnsupportedValueType { kind, offset })
            }
        }
    }

    /// Encodes this payload for an entry of the given kind.
    ///
    /// Kinds without a decoder produce an empty payload, unless they carry
    /// raw bytes captured while decoding, which are written back unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::TypeMismatch`] if the data shape does not fit
    /// `kind`.
    pub fn encode(&self, kind: RegistryValueKind) -> Result<Vec<u8>> {
        if !self.matches_kind(kind) {
            return Err(PolicyError::TypeMismatch {
                kind,
                found: self.shape_name(),
            });
        }

        let mut out = Vec::new();
        match self {
            ValueData::None => {}

            ValueData::String(text) => {
                write_utf16(&mut out, text);
                write_code_unit(&mut out, NUL);
            }

            ValueData::MultiString(items) => {
                for item in items {
                    write_utf16(&mut out, item);
                    write_code_unit(&mut out, NUL);
                }
                if items.is_empty() {
                    write_code_unit(&mut out, NUL);
                }
                write_code_unit(&mut out, NUL);
            }

            ValueData::Binary(bytes) => out.extend_from_slice(bytes),

            ValueData::Dword(value) => out.write_i32::<LittleEndian>(*value)?,

            ValueData::Qword(value) => out.write_i64::<LittleEndian>(*value)?,
        }

        Ok(out)
    }

    /// Returns true if this data may be stored under `kind`.
    ///
    /// `None` fits every kind. `Binary` also fits kinds without a decoder,
    /// which is how raw captured payloads are carried.
    pub fn matches_kind(&self, kind: RegistryValueKind) -> bool {
        match self {
            ValueData::None => true,
            ValueData::String(_) => matches!(
                kind,
                RegistryValueKind::String | RegistryValueKind::ExpandString
            ),
            ValueData::MultiString(_) => kind == RegistryValueKind::MultiString,
            ValueData::Binary(_) => {
                kind == RegistryValueKind::Binary || !kind.has_data_codec()
            }
            ValueData::Dword(_) => kind == RegistryValueKind::Dword,
            ValueData::Qword(_) => kind == RegistryValueKind::Qword,
        }
    }

    /// Short name of the data shape, for error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            ValueData::None => "none",
            ValueData::String(_) => "string",
            ValueData::MultiString(_) => "multi-string",
            ValueData::Binary(_) => "binary",
            ValueData::Dword(_) => "dword",
            ValueData::Qword(_) => "qword",
        }
    }
}

impl fmt::Display for ValueData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueData::None => f.write_str("(none)"),
            ValueData::String(s) => f.write_str(s),
            ValueData::MultiString(strings) => f.write_str(&strings.join(", ")),
            ValueData::Binary(b) => f.write_str(&hex::encode_upper(b)),
            ValueData::Dword(d) => write!(f, "{} (0x{:08X})", d, d),
            ValueData::Qword(q) => write!(f, "{} (0x{:016X})", q, q),
        }
    }
}

/// Returns the first `size` bytes of an integer payload.
fn fixed(data: &[u8], size: usize, offset: usize) -> Result<&[u8]> {
    data.get(..size).ok_or(PolicyError::TruncatedData {
        offset,
        expected: size,
        actual: data.len(),
    })
}
