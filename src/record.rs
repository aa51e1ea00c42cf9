//! Policy records: one registry setting as stored in a policy file.

use crate::error::{PolicyError, Result};
use crate::kind::RegistryValueKind;
use crate::value::ValueData;
use std::fmt;

/// A single registry setting carried by a policy file.
///
/// Records are immutable once built. [`PolicyRecord::new`] computes the
/// declared value length from the encoded payload; records produced by the
/// decoder keep the length declared in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolicyRecord {
    key_name: String,
    value_name: String,
    value_type: RegistryValueKind,
    value_length: u32,
    value_data: ValueData,
}

impl PolicyRecord {
    /// Creates a record, validating it against the format's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::EmptyKeyName`] if `key_name` is empty and
    /// [`PolicyError::TypeMismatch`] if `value_data` does not fit
    /// `value_type`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reg_pol::{PolicyRecord, RegistryValueKind, ValueData};
    ///
    /// let record = PolicyRecord::new(
    ///     r"Software\Policies\Test",
    ///     "MyValue",
    ///     RegistryValueKind::String,
    ///     ValueData::String("hello".into()),
    /// ).unwrap();
    /// // "hello" plus a terminator, two bytes per code unit
    /// assert_eq!(record.value_length(), 12);
    /// ```
    pub fn new(
        key_name: impl Into<String>,
        value_name: impl Into<String>,
        value_type: RegistryValueKind,
        value_data: ValueData,
    ) -> Result<Self> {
        let key_name = key_name.into();
        if key_name.is_empty() {
            return Err(PolicyError::EmptyKeyName);
        }

        let encoded = value_data.encode(value_type)?;
        let value_length = u32::try_from(encoded.len())
            .map_err(|_| PolicyError::PayloadTooLarge(encoded.len()))?;

        Ok(Self {
            key_name,
            value_name: value_name.into(),
            value_type,
            value_length,
            value_data,
        })
    }

    /// Builds a record exactly as read from a file.
    pub(crate) fn from_parts(
        key_name: String,
        value_name: String,
        value_type: RegistryValueKind,
        value_length: u32,
        value_data: ValueData,
    ) -> Self {
        Self {
            key_name,
            value_name,
            value_type,
            value_length,
            value_data,
        }
    }

    /// Registry key path the setting applies to.
    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    /// Name of the value under the key; empty for the default value.
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Value kind written in the entry's type field.
    pub fn value_type(&self) -> RegistryValueKind {
        self.value_type
    }

    /// Declared byte length of the entry's data field.
    pub fn value_length(&self) -> u32 {
        self.value_length
    }

    /// Parsed payload.
    pub fn value_data(&self) -> &ValueData {
        &self.value_data
    }

    /// Consumes the record and returns its payload.
    pub fn into_value_data(self) -> ValueData {
        self.value_data
    }
}

impl fmt::Display for PolicyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}) = {}",
            self.key_name, self.value_name, self.value_type, self.value_data
        )
    }
}
