//! Entry serialization.
//!
//! Layout of one entry (text is UTF-16LE, integers little-endian):
//!
//! ```text
//! [ KeyName NUL ; ValueName NUL ; Type(i32) ; Size(i32) ; Data ]
//! ```

use crate::error::{PolicyError, Result};
use crate::record::PolicyRecord;
use crate::utils::{write_code_unit, write_utf16, CLOSE_BRACKET, NUL, OPEN_BRACKET, SEMICOLON};
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::trace;

/// Appends the bracketed entry for `record` to `out`.
///
/// The size field is the length of the payload actually written, which is
/// what [`PolicyRecord::new`] records as the value length.
///
/// # Errors
///
/// Returns an error if the record's data does not fit its kind or the
/// payload is too large for the size field.
pub fn encode_entry(record: &PolicyRecord, out: &mut Vec<u8>) -> Result<()> {
    let data = record.value_data().encode(record.value_type())?;
    let size = i32::try_from(data.len()).map_err(|_| PolicyError::PayloadTooLarge(data.len()))?;

    write_code_unit(out, OPEN_BRACKET);
    write_utf16(out, record.key_name());
    write_code_unit(out, NUL);
    write_code_unit(out, SEMICOLON);
    write_utf16(out, record.value_name());
    write_code_unit(out, NUL);
    write_code_unit(out, SEMICOLON);
    out.write_i32::<LittleEndian>(record.value_type().code())?;
    write_code_unit(out, SEMICOLON);
    out.write_i32::<LittleEndian>(size)?;
    write_code_unit(out, SEMICOLON);
    out.extend_from_slice(&data);
    write_code_unit(out, CLOSE_BRACKET);

    trace!(key = %record.key_name(), value = %record.value_name(), size, "Encoded entry");
    Ok(())
}

/// Encodes a single entry into a new buffer.
pub fn encode_entry_to_vec(record: &PolicyRecord) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    encode_entry(record, &mut out)?;
    Ok(out)
}
