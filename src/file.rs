//! Reading and writing policy files on disk.
//!
//! The codec itself never touches the file system. This module owns the
//! file handle for the duration of one read or one write and enforces the
//! overwrite policy.

use crate::codec::{decode_with, encode};
use crate::decoder::DecodeOptions;
use crate::error::{PolicyError, Result};
use crate::header::HEADER_SIZE;
use crate::record::PolicyRecord;
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, instrument};

/// How [`write_file`] treats an existing destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Fail with [`PolicyError::PathConflict`] if the destination exists.
    #[default]
    CreateNew,
    /// Replace any existing file.
    Overwrite,
}

/// A decoded policy file.
#[derive(Debug, Clone)]
pub struct PolicyFile {
    records: Vec<PolicyRecord>,
}

impl PolicyFile {
    /// Opens and decodes a policy file with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid policy
    /// file.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use reg_pol::PolicyFile;
    ///
    /// let pol = PolicyFile::open("Registry.pol").unwrap();
    /// for record in pol.records() {
    ///     println!("{}", record);
    /// }
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &DecodeOptions::default())
    }

    /// Opens and decodes a policy file with the given options.
    #[instrument(skip(path, options), fields(path = %path.as_ref().display()))]
    pub fn open_with<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Self> {
        info!("Opening policy file");
        let file = File::open(&path)?;

        // Validate file size BEFORE creating memory map
        let file_size = file.metadata()?.len() as usize;
        if file_size < HEADER_SIZE {
            return Err(PolicyError::TruncatedData {
                offset: 0,
                expected: HEADER_SIZE,
                actual: file_size,
            });
        }

        // SAFETY: The file is opened read-only, its size was checked above,
        // and the map is dropped before this function returns, so no
        // reference into it outlives the call.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(size = mmap.len(), "Memory mapped policy file");

        Self::from_bytes_with(&mmap, options)
    }

    /// Decodes a policy file image already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with(data, &DecodeOptions::default())
    }

    /// Decodes a policy file image with the given options.
    pub fn from_bytes_with(data: &[u8], options: &DecodeOptions) -> Result<Self> {
        let (records, _consumed) = decode_with(data, options)?;
        Ok(Self { records })
    }

    /// Wraps already-built records.
    pub fn from_records(records: Vec<PolicyRecord>) -> Self {
        Self { records }
    }

    /// Records in file order.
    pub fn records(&self) -> &[PolicyRecord] {
        &self.records
    }

    /// Consumes the file and returns its records.
    pub fn into_records(self) -> Vec<PolicyRecord> {
        self.records
    }

    /// Encodes the records back into a file image.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(&self.records)
    }

    /// Writes the records to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P, mode: WriteMode) -> Result<()> {
        write_file(path, &self.records, mode)
    }
}

/// Encodes `records` and writes them to `path`.
///
/// # Errors
///
/// Returns [`PolicyError::PathConflict`] if `path` exists and `mode` is
/// [`WriteMode::CreateNew`], or an I/O or encoding error.
#[instrument(skip(path, records), fields(path = %path.as_ref().display(), count = records.len()))]
pub fn write_file<P: AsRef<Path>>(path: P, records: &[PolicyRecord], mode: WriteMode) -> Result<()> {
    let path = path.as_ref();
    // Encode before the destination is opened or truncated.
    let bytes = encode(records)?;

    let mut file = match mode {
        WriteMode::CreateNew => OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => PolicyError::PathConflict(path.to_path_buf()),
                _ => PolicyError::Io(err),
            })?,
        WriteMode::Overwrite => File::create(path)?,
    };

    file.write_all(&bytes)?;
    file.flush()?;

    info!(size = bytes.len(), "Wrote policy file");
    Ok(())
}
