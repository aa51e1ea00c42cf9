//! # Group Policy Registry.pol Reader and Writer
//!
//! Decodes and encodes the `Registry.pol` files in which Group Policy stores
//! registry settings.
//!
//! ## Features
//!
//! - **Strict decoding**: every entry is checked field by field and the first
//!   error stops decoding with the byte offset where it happened
//! - **Type-safe values**: payloads are decoded into [`ValueData`] according
//!   to their [`RegistryValueKind`]
//! - **Lossless binary data**: `REG_BINARY` payloads are copied verbatim
//! - **No hidden I/O**: the codec works on byte buffers; [`PolicyFile`] and
//!   [`write_file`] are a thin layer for callers that want file access
//!
//! ## Binary Layout
//!
//! Integers are little-endian and text is UTF-16LE.
//!
//! ```text
//! [Header - 8 bytes]
//!   - Signature: "PReg"
//!   - Version: 1
//!
//! [Entries - repeated until end of file]
//!   [ KeyName NUL ; ValueName NUL ; Type(i32) ; Size(i32) ; Data ]
//! ```
//!
//! ## Examples
//!
//! ### Round Trip
//!
//! ```
//! use reg_pol::{decode, encode, PolicyRecord, RegistryValueKind, ValueData};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let record = PolicyRecord::new(
//!     r"Software\Policies\Test",
//!     "MyValue",
//!     RegistryValueKind::String,
//!     ValueData::String("hello".into()),
//! )?;
//!
//! let bytes = encode(&[record.clone()])?;
//! let (records, _consumed) = decode(&bytes)?;
//! assert_eq!(records, vec![record]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a File
//!
//! ```no_run
//! use reg_pol::{PolicyFile, ValueData};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pol = PolicyFile::open("Machine/Registry.pol")?;
//! for record in pol.records() {
//!     match record.value_data() {
//!         ValueData::String(s) => println!("{}\\{} = {}", record.key_name(), record.value_name(), s),
//!         ValueData::Dword(d) => println!("{}\\{} = {}", record.key_name(), record.value_name(), d),
//!         other => println!("{}\\{} = {}", record.key_name(), record.value_name(), other),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod file;
pub mod header;
pub mod integer;
pub mod kind;
pub mod multi_string;
pub mod record;
pub mod utils;
pub mod value;

// Python bindings (only compiled when python feature is enabled)
#[cfg(feature = "python")]
pub mod python;

// Re-export main types for convenience
pub use codec::{decode, decode_with, encode};
pub use decoder::{DecodeOptions, UnsupportedTypePolicy, TRAILING_SLACK};
pub use error::{EntryFault, PolicyError, Result};
pub use file::{write_file, PolicyFile, WriteMode};
pub use integer::{decode_integer, Integer};
pub use kind::RegistryValueKind;
pub use record::PolicyRecord;
pub use value::ValueData;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
