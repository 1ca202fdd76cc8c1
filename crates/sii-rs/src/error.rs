// crates/sii-rs/src/error.rs

use crate::header::Preamble;
use core::fmt;

/// Defines the error type for the SII codec.
///
/// Fixed-header errors abort a decode; category-level problems are reported
/// as [`Finding`](crate::Finding)s by the scanner and the validator instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiiError {
    /// A read needed more bytes than the buffer holds.
    TruncatedInput { offset: usize, needed: usize },
    /// A write needed more room than the output buffer has.
    BufferOverflow { offset: usize, needed: usize },
    /// The stored preamble checksum does not match the recomputed CRC.
    /// The decoded preamble is returned so callers can still inspect it.
    ChecksumMismatch {
        stored: u16,
        computed: u8,
        preamble: Preamble,
    },
    /// A category payload could not be parsed according to its record shape.
    MalformedCategory(MalformedCategory),
    /// The model cannot be serialized into a valid image.
    Generation(GenerationError),
}

/// Location and reason of a category that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedCategory {
    /// Raw 15-bit category type code.
    pub type_code: u16,
    /// Byte offset of the offending record, relative to the category payload.
    pub offset: usize,
    pub reason: MalformedReason,
}

/// Why a category payload was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Payload is shorter than the category's fixed record.
    TooShort { minimum: usize, actual: usize },
    /// The remaining bytes cannot form a whole record.
    PartialRecord { record_size: usize, remaining: usize },
    /// A string's length prefix runs past the payload.
    StringOverrun { index: usize },
    /// Bytes are left over after the last declared string.
    TrailingBytes { count: usize },
    /// A PDO declares more entries than the payload contains.
    PdoEntryCount { pdo_index: u16, declared: u8, present: usize },
}

/// Reasons for an encode to fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The generated image is larger than the declared EEPROM capacity.
    CapacityExceeded { required: usize, capacity: usize },
    /// A category references a string that does not exist in the Strings category.
    DanglingStringIndex { category: usize, index: u8 },
    /// A string entry cannot be represented in the Strings category.
    StringNotEncodable { index: usize },
    /// More than 255 strings, or more than 255 entries in a single PDO.
    TooManyRecords { category: usize, count: usize },
    /// A category payload exceeds the 16-bit word-size field.
    CategoryTooLarge { category: usize, bytes: usize },
}

impl fmt::Display for SiiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedInput { offset, needed } => write!(
                f,
                "Input truncated: {needed} byte(s) required at offset {offset:#06x}"
            ),
            Self::BufferOverflow { offset, needed } => write!(
                f,
                "Output buffer overflow: {needed} byte(s) do not fit at offset {offset:#06x}"
            ),
            Self::ChecksumMismatch {
                stored, computed, ..
            } => write!(
                f,
                "Preamble checksum mismatch: stored {stored:#06x}, computed {computed:#04x}"
            ),
            Self::MalformedCategory(m) => write!(f, "{m}"),
            Self::Generation(e) => write!(f, "Generation error: {e}"),
        }
    }
}

impl fmt::Display for MalformedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Malformed category (type {}) at payload offset {:#06x}: {}",
            self.type_code, self.offset, self.reason
        )
    }
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { minimum, actual } => {
                write!(f, "payload has {actual} bytes, at least {minimum} required")
            }
            Self::PartialRecord {
                record_size,
                remaining,
            } => write!(
                f,
                "{remaining} trailing byte(s) do not form a {record_size}-byte record"
            ),
            Self::StringOverrun { index } => {
                write!(f, "string {index} runs past the end of the payload")
            }
            Self::TrailingBytes { count } => {
                write!(f, "{count} unexpected byte(s) after the last string")
            }
            Self::PdoEntryCount {
                pdo_index,
                declared,
                present,
            } => write!(
                f,
                "PDO {pdo_index:#06x} declares {declared} entries but only {present} are present"
            ),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { required, capacity } => write!(
                f,
                "image needs {required} bytes but the EEPROM holds {capacity}"
            ),
            Self::DanglingStringIndex { category, index } => write!(
                f,
                "category {category} references missing string index {index}"
            ),
            Self::StringNotEncodable { index } => write!(
                f,
                "string {index} is longer than 255 bytes or holds characters above U+00FF"
            ),
            Self::TooManyRecords { category, count } => write!(
                f,
                "category {category} holds {count} records, at most 255 allowed"
            ),
            Self::CategoryTooLarge { category, bytes } => write!(
                f,
                "category {category} payload of {bytes} bytes exceeds the size field"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SiiError {}

// --- From Implementations for Error Conversion ---

impl From<MalformedCategory> for SiiError {
    fn from(err: MalformedCategory) -> Self {
        SiiError::MalformedCategory(err)
    }
}

impl From<GenerationError> for SiiError {
    fn from(err: GenerationError) -> Self {
        SiiError::Generation(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_from_generation_error() {
        let err: SiiError = GenerationError::CapacityExceeded {
            required: 300,
            capacity: 256,
        }
        .into();
        assert!(matches!(
            err,
            SiiError::Generation(GenerationError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_display_reports_offset_in_hex() {
        let err = SiiError::TruncatedInput {
            offset: 0x80,
            needed: 4,
        };
        assert_eq!(
            err.to_string(),
            "Input truncated: 4 byte(s) required at offset 0x0080"
        );
    }

    #[test]
    fn test_display_malformed_pdo() {
        let err: SiiError = MalformedCategory {
            type_code: 50,
            offset: 0,
            reason: MalformedReason::PdoEntryCount {
                pdo_index: 0x1A00,
                declared: 3,
                present: 2,
            },
        }
        .into();
        assert!(err.to_string().contains("0x1a00 declares 3 entries"));
    }
}
