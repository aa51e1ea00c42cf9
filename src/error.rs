//! Error types for policy file operations.
//!
//! Every failure is fatal for the operation that raised it. Decoding is
//! strictly sequential, so an error carries the byte offset at which the
//! cursor stopped and no partial record list is ever returned.

use crate::header::POL_SIGNATURE;
use crate::kind::RegistryValueKind;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for policy file operations.
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Structural faults that make an entry unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFault {
    /// The entry does not start with `[`.
    MissingOpenBracket,
    /// A field is not followed by `;`.
    MissingSemicolon,
    /// A name field does not end with a NUL code unit before its `;`.
    MissingNullTerminator,
    /// No `]` closes the entry.
    MissingCloseBracket,
    /// The key name field is empty.
    EmptyKeyName,
    /// The declared value length is negative.
    NegativeLength,
    /// The buffer ends before a fixed-size field or the declared data.
    Truncated,
}

impl fmt::Display for EntryFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            EntryFault::MissingOpenBracket => "missing opening '['",
            EntryFault::MissingSemicolon => "missing ';' delimiter",
            EntryFault::MissingNullTerminator => "name is not null-terminated",
            EntryFault::MissingCloseBracket => "missing closing ']'",
            EntryFault::EmptyKeyName => "empty key name",
            EntryFault::NegativeLength => "negative value length",
            EntryFault::Truncated => "entry truncated",
        };
        f.write_str(msg)
    }
}

/// Errors that can occur while reading or writing policy files.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// I/O error occurred while reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Buffer is shorter than a fixed-size structure.
    #[error("Truncated data at offset {offset:#x}: expected {expected} bytes, got {actual} bytes")]
    TruncatedData {
        offset: usize,
        expected: usize,
        actual: usize,
    },

    /// The file does not start with the policy file signature.
    #[error("Invalid signature: expected {expected:?}, found {found:?}")]
    InvalidSignature {
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    /// The header carries a version other than 1.
    #[error("Unsupported policy file version: {0}")]
    InvalidVersion(u32),

    /// An entry violates the bracketed entry layout.
    #[error("Malformed entry at offset {offset:#x}: {fault}")]
    MalformedEntry {
        offset: usize,
        fault: EntryFault,
    },

    /// A payload was present for a value kind that has no data decoder.
    #[error("Unsupported value type {kind} with payload at offset {offset:#x}")]
    UnsupportedValueType {
        kind: RegistryValueKind,
        offset: usize,
    },

    /// The type field holds a code outside the registry value kinds.
    #[error("Invalid value type code {code} at offset {offset:#x}")]
    InvalidValueType {
        code: i32,
        offset: usize,
    },

    /// More than 8 bytes were handed to the integer decoder.
    #[error("Invalid integer size: {0} bytes (maximum: 8 bytes)")]
    InvalidIntegerSize(usize),

    /// Invalid UTF-16 string data.
    #[error("Invalid UTF-16 string at offset {offset:#x}")]
    InvalidUtf16 {
        offset: usize,
    },

    /// The value data does not have the shape its declared kind requires.
    #[error("Value data {found} does not match value type {kind}")]
    TypeMismatch {
        kind: RegistryValueKind,
        found: &'static str,
    },

    /// A payload does not fit the 32-bit length field.
    #[error("Payload of {0} bytes exceeds the entry length field")]
    PayloadTooLarge(usize),

    /// A record was built without a key name.
    #[error("Key name must not be empty")]
    EmptyKeyName,

    /// The destination exists and overwriting was not permitted.
    #[error("Destination already exists: {}", .0.display())]
    PathConflict(PathBuf),
}

impl PolicyError {
    /// Creates an invalid signature error with context.
    ///
    /// # Arguments
    ///
    /// * `expected` - Expected signature bytes
    /// * `found` - Actual signature bytes found
    pub fn invalid_signature(expected: &[u8], found: &[u8]) -> Self {
        Self::InvalidSignature {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }

    /// Creates a malformed entry error.
    pub fn malformed(offset: usize, fault: EntryFault) -> Self {
        Self::MalformedEntry { offset, fault }
    }

    /// Returns the byte offset associated with this error, if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use reg_pol::error::{EntryFault, PolicyError};
    /// let err = PolicyError::malformed(0x10, EntryFault::MissingOpenBracket);
    /// assert_eq!(err.offset(), Some(0x10));
    /// ```
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::TruncatedData { offset, .. }
            | Self::MalformedEntry { offset, .. }
            | Self::UnsupportedValueType { offset, .. }
            | Self::InvalidValueType { offset, .. }
            | Self::InvalidUtf16 { offset } => Some(*offset),
            Self::InvalidSignature { .. } => Some(0),
            Self::InvalidVersion(_) => Some(POL_SIGNATURE.len()),
            Self::Io(_)
            | Self::InvalidIntegerSize(_)
            | Self::PayloadTooLarge(_)
            | Self::TypeMismatch { .. }
            | Self::EmptyKeyName
            | Self::PathConflict(_) => None,
        }
    }
}
