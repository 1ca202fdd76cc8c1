// crates/sii-rs/src/finding.rs

//! Non-fatal diagnostics produced by the scanner, the validator and the façade.

use crate::error::{MalformedCategory, MalformedReason};
use crate::header::MailboxKind;
use crate::types::CategoryType;
use core::fmt;

/// How serious a finding is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Where a finding applies. Either part may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Absolute byte offset in the image.
    pub offset: Option<usize>,
    /// Index of the category in model order.
    pub category: Option<usize>,
}

impl Location {
    pub fn at_offset(offset: usize) -> Self {
        Self {
            offset: Some(offset),
            category: None,
        }
    }

    pub fn in_category(category: usize) -> Self {
        Self {
            offset: None,
            category: Some(category),
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Reserved regions checked by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedRegion {
    Preamble,
    StdConfig,
    MailboxProtocols,
    General,
    DistributedClock,
}

/// The kind of problem a [`Finding`] describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingCode {
    ChecksumMismatch { stored: u16, computed: u8 },
    ReservedNonZero { region: ReservedRegion },
    MailboxOutOfBounds { mailbox: MailboxKind, end: u32, capacity: usize },
    /// The encoded image is larger than the declared EEPROM capacity.
    ImageExceedsCapacity { required: usize, capacity: usize },
    /// A PDO holds more entries than its u8 count field can express.
    PdoEntryCount { pdo_index: u16, count: usize },
    DanglingStringIndex { index: u8 },
    StaleCategorySize { declared: u16, actual: usize },
    MalformedCategory(MalformedCategory),
    TruncatedInput { needed: usize },
    MissingEndMarker,
    UnknownCategory { type_code: u16 },
    FormatHintMismatch { hint: crate::InputFormat, detected: crate::InputFormat },
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub code: FindingCode,
    pub location: Location,
}

impl Finding {
    pub fn new(severity: Severity, code: FindingCode, location: Location) -> Self {
        Self {
            severity,
            code,
            location,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// The reason of a malformed-category finding, if this is one.
    pub fn malformed_reason(&self) -> Option<MalformedReason> {
        match &self.code {
            FindingCode::MalformedCategory(m) => Some(m.reason),
            _ => None,
        }
    }
}

/// True if any finding has severity [`Severity::Error`].
pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(Finding::is_error)
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for ReservedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preamble => write!(f, "preamble"),
            Self::StdConfig => write!(f, "station configuration"),
            Self::MailboxProtocols => write!(f, "mailbox protocol word"),
            Self::General => write!(f, "General category"),
            Self::DistributedClock => write!(f, "DistributedClock category"),
        }
    }
}

impl fmt::Display for MailboxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BootstrapReceive => write!(f, "bootstrap receive"),
            Self::BootstrapSend => write!(f, "bootstrap send"),
            Self::StandardReceive => write!(f, "standard receive"),
            Self::StandardSend => write!(f, "standard send"),
        }
    }
}

impl fmt::Display for FindingCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "preamble checksum {stored:#06x} does not match computed {computed:#04x}"
            ),
            Self::ReservedNonZero { region } => {
                write!(f, "reserved bits of the {region} are not zero")
            }
            Self::MailboxOutOfBounds {
                mailbox,
                end,
                capacity,
            } => write!(
                f,
                "{mailbox} mailbox ends at {end:#06x}, beyond the EEPROM capacity of {capacity} bytes"
            ),
            Self::ImageExceedsCapacity { required, capacity } => write!(
                f,
                "image takes {required} bytes, beyond the EEPROM capacity of {capacity} bytes"
            ),
            Self::PdoEntryCount { pdo_index, count } => write!(
                f,
                "PDO {pdo_index:#06x} has {count} entries, at most 255 can be encoded"
            ),
            Self::DanglingStringIndex { index } => {
                write!(f, "string index {index} does not resolve")
            }
            Self::StaleCategorySize { declared, actual } => write!(
                f,
                "declared size of {declared} words differs from the encoded size of {actual} words"
            ),
            Self::MalformedCategory(m) => write!(
                f,
                "{} payload malformed at offset {:#06x}: {}",
                CategoryType::from(m.type_code),
                m.offset,
                m.reason
            ),
            Self::TruncatedInput { needed } => {
                write!(f, "input ends {needed} byte(s) short of a complete category")
            }
            Self::MissingEndMarker => write!(f, "category list has no end marker"),
            Self::UnknownCategory { type_code } => {
                write!(f, "unknown category type {type_code:#06x} kept as raw data")
            }
            Self::FormatHintMismatch { hint, detected } => write!(
                f,
                "format hint {hint} contradicts detected format {detected}"
            ),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        match (self.location.category, self.location.offset) {
            (Some(category), Some(offset)) => write!(f, " [category {category} @ {offset:#06x}]")?,
            (Some(category), None) => write!(f, " [category {category}]")?,
            (None, Some(offset)) => write!(f, " [@ {offset:#06x}]")?,
            (None, None) => {}
        }
        write!(f, ": {}", self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_display_with_location() {
        let finding = Finding::new(
            Severity::Warning,
            FindingCode::MissingEndMarker,
            Location::in_category(2).with_offset(0x90),
        );
        assert_eq!(
            finding.to_string(),
            "warning [category 2 @ 0x0090]: category list has no end marker"
        );
    }

    #[test]
    fn test_has_errors() {
        let info = Finding::new(
            Severity::Info,
            FindingCode::UnknownCategory { type_code: 0x0800 },
            Location::default(),
        );
        assert!(!has_errors(&[info.clone()]));
        let error = Finding::new(
            Severity::Error,
            FindingCode::TruncatedInput { needed: 2 },
            Location::at_offset(0x80),
        );
        assert!(has_errors(&vec![info, error]));
    }
}
