//! Whole-file decoding and encoding.
//!
//! These functions work on in-memory buffers only. Reading and writing the
//! bytes is left to the caller, or to [`crate::file`].

use crate::decoder::{Cursor, DecodeOptions, EntryDecoder};
use crate::encoder::encode_entry;
use crate::error::Result;
use crate::header::{self, HEADER_SIZE};
use crate::record::PolicyRecord;
use tracing::{debug, instrument};

/// Decodes a policy file buffer with default options.
///
/// Returns the records in file order and the number of bytes consumed. A
/// tail no longer than [`crate::decoder::TRAILING_SLACK`] is left unread.
///
/// # Errors
///
/// Returns the first header or entry error; no partial result is produced.
///
/// # Examples
///
/// ```rust
/// let (records, consumed) = reg_pol::decode(b"PReg\x01\x00\x00\x00").unwrap();
/// assert!(records.is_empty());
/// assert_eq!(consumed, 8);
/// ```
pub fn decode(data: &[u8]) -> Result<(Vec<PolicyRecord>, usize)> {
    decode_with(data, &DecodeOptions::default())
}

/// Decodes a policy file buffer with the given options.
///
/// # Errors
///
/// Returns the first header or entry error; no partial result is produced.
#[instrument(skip_all, fields(size = data.len()))]
pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<(Vec<PolicyRecord>, usize)> {
    header::validate(data)?;
    debug!("Header validated");

    let decoder = EntryDecoder::new(data, options);
    let mut records = Vec::new();
    let mut cursor = Cursor::new(HEADER_SIZE);

    while decoder.has_entry_at(cursor) {
        let (record, next) = decoder.decode_entry(cursor)?;
        records.push(record);
        cursor = next;
    }

    debug!(count = records.len(), consumed = cursor.offset(), "Decoded policy file");
    Ok((records, cursor.offset()))
}

/// Encodes records into a complete policy file image, header first and
/// entries in input order.
///
/// # Errors
///
/// Returns an error if any record's data does not fit its kind.
#[instrument(skip_all, fields(count = records.len()))]
pub fn encode(records: &[PolicyRecord]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(HEADER_SIZE + records.len() * 64);
    out.extend_from_slice(&header::emit());

    for record in records {
        encode_entry(record, &mut out)?;
    }

    debug!(size = out.len(), "Encoded policy file");
    Ok(out)
}
