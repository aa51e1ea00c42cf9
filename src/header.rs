//! Policy file header validation and emission.
//!
//! A `Registry.pol` file starts with an 8-byte header: the ASCII signature
//! `PReg` followed by a little-endian 32-bit version that is always 1.
//! Entries follow immediately after it.

use crate::error::{PolicyError, Result};
use crate::utils::{read_ascii_string, read_u32_le};

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Expected signature for a policy file ("PReg").
pub const POL_SIGNATURE: &[u8; 4] = b"PReg";

/// The signature as a little-endian 32-bit value.
pub const POL_SIGNATURE_VALUE: u32 = 0x6765_5250;

/// The only defined format version.
pub const POL_VERSION: u32 = 1;

/// Checks that `data` starts with a valid policy file header.
///
/// # Errors
///
/// Returns an error if:
/// - Data is shorter than the header
/// - Signature is not `PReg`
/// - Version is not 1
pub fn validate(data: &[u8]) -> Result<()> {
    if data.len() < HEADER_SIZE {
        return Err(PolicyError::TruncatedData {
            offset: 0,
            expected: HEADER_SIZE,
            actual: data.len(),
        });
    }

    let signature = read_ascii_string(&data[0..4]);
    if signature.as_bytes() != POL_SIGNATURE {
        return Err(PolicyError::invalid_signature(POL_SIGNATURE, &data[0..4]));
    }

    let version = read_u32_le(data, 4)?;
    if version != POL_VERSION {
        return Err(PolicyError::InvalidVersion(version));
    }

    Ok(())
}

/// Returns the header bytes written at the start of every policy file.
pub fn emit() -> [u8; HEADER_SIZE] {
    let mut header = [0u8; HEADER_SIZE];
    header[0..4].copy_from_slice(&POL_SIGNATURE_VALUE.to_le_bytes());
    header[4..8].copy_from_slice(&POL_VERSION.to_le_bytes());
    header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_value_matches_literal() {
        assert_eq!(&POL_SIGNATURE_VALUE.to_le_bytes(), POL_SIGNATURE);
    }

    #[test]
    fn test_emit_validates() {
        let header = emit();
        assert_eq!(&header, b"PReg\x01\x00\x00\x00");
        validate(&header).unwrap();
    }

    #[test]
    fn test_invalid_signature() {
        let mut data = emit();
        data[0..4].copy_from_slice(b"PREG");

        let result = validate(&data);
        assert!(matches!(result.unwrap_err(), PolicyError::InvalidSignature { .. }));
    }

    #[test]
    fn test_invalid_version() {
        let mut data = emit();
        data[4] = 2;

        let result = validate(&data);
        assert!(matches!(result.unwrap_err(), PolicyError::InvalidVersion(2)));
    }

    #[test]
    fn test_too_small() {
        let result = validate(b"PReg");
        assert!(matches!(result.unwrap_err(), PolicyError::TruncatedData { .. }));
    }
}
