// crates/sii-rs/src/config.rs

//! Options steering decode, validation and encode.

use crate::types::EepromSizeUnit;
use core::fmt;

/// What a preamble checksum mismatch does during decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumPolicy {
    /// Abort the decode with [`SiiError::ChecksumMismatch`](crate::SiiError::ChecksumMismatch).
    #[default]
    Strict,
    /// Keep decoding and report an Error finding.
    Lenient,
}

/// Serialization format of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Binary SII EEPROM image.
    Sii,
    /// ESI (EtherCATInfo) XML.
    Esi,
}

impl InputFormat {
    /// Detects the format from the content. Leading whitespace and a UTF-8
    /// byte order mark are skipped.
    pub fn sniff(bytes: &[u8]) -> Self {
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
        let start = bytes
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(bytes.len());
        if bytes[start..].starts_with(b"<?xml") {
            Self::Esi
        } else {
            Self::Sii
        }
    }

    /// Maps a file extension (without the dot, any case) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("bin") || extension.eq_ignore_ascii_case("sii") {
            Some(Self::Sii)
        } else if extension.eq_ignore_ascii_case("xml") {
            Some(Self::Esi)
        } else {
            None
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sii => write!(f, "SII"),
            Self::Esi => write!(f, "ESI"),
        }
    }
}

/// Configuration of a [`SiiCodec`](crate::SiiCodec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub checksum: ChecksumPolicy,
    /// Interpretation of the `eeprom_size` word.
    pub size_unit: EepromSizeUnit,
    /// Fail `encode` when the image exceeds the declared EEPROM capacity.
    pub enforce_capacity: bool,
    /// Format the caller expects. Content detection always wins.
    pub format_hint: Option<InputFormat>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            checksum: ChecksumPolicy::Strict,
            size_unit: EepromSizeUnit::Words,
            enforce_capacity: true,
            format_hint: None,
        }
    }
}

impl CodecConfig {
    pub fn with_checksum(mut self, checksum: ChecksumPolicy) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn with_size_unit(mut self, size_unit: EepromSizeUnit) -> Self {
        self.size_unit = size_unit;
        self
    }

    pub fn with_enforce_capacity(mut self, enforce: bool) -> Self {
        self.enforce_capacity = enforce;
        self
    }

    pub fn with_format_hint(mut self, hint: InputFormat) -> Self {
        self.format_hint = Some(hint);
        self
    }
}
