//! Registry value kinds used as the wire type tag.
//!
//! The numeric code is what appears in a policy entry's type field. The
//! little-endian aliases share a code with their canonical kind, so they are
//! modelled as associated constants rather than separate enumerants.

use crate::error::{PolicyError, Result};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Registry value data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistryValueKind {
    /// No value type.
    None,

    /// String (null-terminated).
    String,

    /// String with environment variables.
    ExpandString,

    /// Binary data.
    Binary,

    /// 32-bit little-endian integer.
    Dword,

    /// 32-bit big-endian integer.
    DwordBigEndian,

    /// Symbolic link (Unicode).
    Link,

    /// Multiple strings.
    MultiString,

    /// Resource list.
    ResourceList,

    /// Full resource descriptor.
    FullResourceDescriptor,

    /// Resource requirements list.
    ResourceRequirementsList,

    /// 64-bit little-endian integer.
    Qword,
}

/// Alternate names that resolve to a canonical kind.
const ALIASES: &[(&str, RegistryValueKind)] = &[
    ("REG_DWORD_LITTLE_ENDIAN", RegistryValueKind::Dword),
    ("REG_QWORD_LITTLE_ENDIAN", RegistryValueKind::Qword),
];

impl RegistryValueKind {
    /// Alias of [`RegistryValueKind::Dword`].
    pub const DWORD_LITTLE_ENDIAN: Self = Self::Dword;

    /// Alias of [`RegistryValueKind::Qword`].
    pub const QWORD_LITTLE_ENDIAN: Self = Self::Qword;

    /// Every kind in wire-code order.
    pub const ALL: [Self; 12] = [
        Self::None,
        Self::String,
        Self::ExpandString,
        Self::Binary,
        Self::Dword,
        Self::DwordBigEndian,
        Self::Link,
        Self::MultiString,
        Self::ResourceList,
        Self::FullResourceDescriptor,
        Self::ResourceRequirementsList,
        Self::Qword,
    ];

    /// Parses a value kind from its wire code.
    ///
    /// `offset` is only used for error reporting.
    pub fn from_code(code: i32, offset: usize) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::String),
            2 => Ok(Self::ExpandString),
            3 => Ok(Self::Binary),
            4 => Ok(Self::Dword),
            5 => Ok(Self::DwordBigEndian),
            6 => Ok(Self::Link),
            7 => Ok(Self::MultiString),
            8 => Ok(Self::ResourceList),
            9 => Ok(Self::FullResourceDescriptor),
            10 => Ok(Self::ResourceRequirementsList),
            11 => Ok(Self::Qword),
            _ => Err(PolicyError::InvalidValueType { code, offset }),
        }
    }

    /// Returns the wire code of this kind.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::String => 1,
            Self::ExpandString => 2,
            Self::Binary => 3,
            Self::Dword => 4,
            Self::DwordBigEndian => 5,
            Self::Link => 6,
            Self::MultiString => 7,
            Self::ResourceList => 8,
            Self::FullResourceDescriptor => 9,
            Self::ResourceRequirementsList => 10,
            Self::Qword => 11,
        }
    }

    /// Returns the name of this value type.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "REG_NONE",
            Self::String => "REG_SZ",
            Self::ExpandString => "REG_EXPAND_SZ",
            Self::Binary => "REG_BINARY",
            Self::Dword => "REG_DWORD",
            Self::DwordBigEndian => "REG_DWORD_BIG_ENDIAN",
            Self::Link => "REG_LINK",
            Self::MultiString => "REG_MULTI_SZ",
            Self::ResourceList => "REG_RESOURCE_LIST",
            Self::FullResourceDescriptor => "REG_FULL_RESOURCE_DESCRIPTOR",
            Self::ResourceRequirementsList => "REG_RESOURCE_REQUIREMENTS_LIST",
            Self::Qword => "REG_QWORD",
        }
    }

    /// Returns true if policy entries of this kind carry a decodable payload.
    pub fn has_data_codec(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::ExpandString
                | Self::MultiString
                | Self::Binary
                | Self::Dword
                | Self::Qword
        )
    }
}

impl fmt::Display for RegistryValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a name matches no value kind or alias.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown registry value kind '{0}'")]
pub struct UnknownKindName(pub String);

impl FromStr for RegistryValueKind {
    type Err = UnknownKindName;

    /// Accepts canonical names and aliases, with or without the `REG_` prefix.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let full = if upper.starts_with("REG_") {
            upper
        } else {
            format!("REG_{}", upper)
        };

        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == full)
            .or_else(|| {
                ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == full)
                    .map(|(_, kind)| *kind)
            })
            .ok_or_else(|| UnknownKindName(s.to_string()))
    }
}
