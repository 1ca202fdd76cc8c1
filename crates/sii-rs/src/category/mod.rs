//! Defines the SII category records and their payload codecs.
//!
//! Each category is a type-length-value record following the fixed header:
//! a header word (15-bit type, vendor flag in bit 15), a size in words, and
//! `size * 2` payload bytes. (Reference: ETG.1000.6, Section 5.4, Table 19)

pub mod dclock;
pub mod fmmu;
pub mod general;
pub mod pdo;
pub mod scanner;
pub mod strings;
pub mod sync_manager;

pub use dclock::{DistributedClock, LatchConfig};
pub use fmmu::{Fmmu, FmmuCategory, FmmuUsage};
pub use general::{CoeDetails, General, PortType};
pub use pdo::{Pdo, PdoCategory, PdoDirection, PdoEntry};
pub use scanner::{scan_categories, ScanOutcome};
pub use strings::StringsCategory;
pub use sync_manager::{SyncManager, SyncManagerCategory, SyncManagerType};

use crate::cursor::Cursor;
use crate::error::{GenerationError, MalformedCategory, MalformedReason};
use crate::types::{CategoryType, CATEGORY_END, CATEGORY_TYPE_MASK, CATEGORY_VENDOR_FLAG, SII_WORD};
use crate::SiiError;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

/// A trait for category payloads that can be decoded from, and encoded into,
/// the byte region isolated by the category header.
pub trait CategoryCodec: Sized {
    /// Decodes a payload. The header was parsed by the scanner and is passed in
    /// separately; `payload` holds exactly `size * 2` bytes.
    fn decode(header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory>;

    /// Writes the payload without word padding.
    /// Callers must run [`CategoryCodec::check`] first.
    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError>;

    /// Number of bytes `encode` writes.
    fn encoded_len(&self) -> usize;

    /// Verifies that the payload can be represented on the EEPROM.
    fn check(&self, _category: usize) -> Result<(), GenerationError> {
        Ok(())
    }
}

// --- Category Header ---

/// The 4-byte header preceding each category payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryHeader {
    pub kind: CategoryType,
    pub vendor_specific: bool,
    /// Payload size in words.
    pub size: u16,
}

impl CategoryHeader {
    /// Splits a header word into type code and vendor flag.
    /// Returns `None` for the end sentinel.
    pub fn from_word(word: u16, size: u16) -> Option<Self> {
        if word == CATEGORY_END {
            return None;
        }
        Some(Self {
            kind: CategoryType::from(word & CATEGORY_TYPE_MASK),
            vendor_specific: word & CATEGORY_VENDOR_FLAG != 0,
            size,
        })
    }

    pub fn to_word(&self) -> u16 {
        let mut word = self.kind.code() & CATEGORY_TYPE_MASK;
        if self.vendor_specific {
            word |= CATEGORY_VENDOR_FLAG;
        }
        word
    }

    /// Payload length in bytes.
    pub fn payload_len(&self) -> usize {
        usize::from(self.size) * SII_WORD
    }

    pub(crate) fn malformed(&self, offset: usize, reason: MalformedReason) -> MalformedCategory {
        MalformedCategory {
            type_code: self.kind.code(),
            offset,
            reason,
        }
    }
}

// --- Category Identity ---

/// Model-scoped identifier of a category. Only meaningful for the
/// [`CategoryModel`](crate::CategoryModel) that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub(crate) u32);

impl CategoryId {
    /// Id of a category that was not yet appended to a model.
    pub const UNASSIGNED: CategoryId = CategoryId(0);
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Decoded payload of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryData {
    Strings(StringsCategory),
    General(General),
    Fmmu(FmmuCategory),
    SyncManager(SyncManagerCategory),
    /// TxPDO or RxPDO, depending on [`PdoCategory::direction`].
    Pdo(PdoCategory),
    DistributedClock(DistributedClock),
    /// Unknown type, or a known type whose payload failed to decode.
    Opaque { kind: CategoryType, payload: Vec<u8> },
}

impl CategoryData {
    pub fn kind(&self) -> CategoryType {
        match self {
            Self::Strings(_) => CategoryType::Strings,
            Self::General(_) => CategoryType::General,
            Self::Fmmu(_) => CategoryType::Fmmu,
            Self::SyncManager(_) => CategoryType::SyncManager,
            Self::Pdo(pdo) => pdo.direction.category_type(),
            Self::DistributedClock(_) => CategoryType::DistributedClock,
            Self::Opaque { kind, .. } => *kind,
        }
    }

    /// Decodes a payload by type. Unknown types become [`CategoryData::Opaque`].
    pub fn decode(header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory> {
        Ok(match header.kind {
            CategoryType::Strings => Self::Strings(StringsCategory::decode(header, payload)?),
            CategoryType::General => Self::General(General::decode(header, payload)?),
            CategoryType::Fmmu => Self::Fmmu(FmmuCategory::decode(header, payload)?),
            CategoryType::SyncManager => {
                Self::SyncManager(SyncManagerCategory::decode(header, payload)?)
            }
            CategoryType::TxPdo | CategoryType::RxPdo => {
                Self::Pdo(PdoCategory::decode(header, payload)?)
            }
            CategoryType::DistributedClock => {
                Self::DistributedClock(DistributedClock::decode(header, payload)?)
            }
            CategoryType::Other(_) => Self::Opaque {
                kind: header.kind,
                payload: payload.to_vec(),
            },
        })
    }

    pub fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(
        &self,
        cursor: &mut Cursor<B>,
    ) -> Result<(), SiiError> {
        match self {
            Self::Strings(c) => c.encode(cursor),
            Self::General(c) => c.encode(cursor),
            Self::Fmmu(c) => c.encode(cursor),
            Self::SyncManager(c) => c.encode(cursor),
            Self::Pdo(c) => c.encode(cursor),
            Self::DistributedClock(c) => c.encode(cursor),
            Self::Opaque { payload, .. } => cursor.write_bytes(payload),
        }
    }

    /// Payload length in bytes, before word padding.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Strings(c) => c.encoded_len(),
            Self::General(c) => c.encoded_len(),
            Self::Fmmu(c) => c.encoded_len(),
            Self::SyncManager(c) => c.encoded_len(),
            Self::Pdo(c) => c.encoded_len(),
            Self::DistributedClock(c) => c.encoded_len(),
            Self::Opaque { payload, .. } => payload.len(),
        }
    }

    pub fn check(&self, category: usize) -> Result<(), GenerationError> {
        match self {
            Self::Strings(c) => c.check(category),
            Self::Pdo(c) => c.check(category),
            _ => Ok(()),
        }
    }
}

/// A single category entry of a [`CategoryModel`](crate::CategoryModel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub(crate) id: CategoryId,
    pub vendor_specific: bool,
    /// Size in words as read from the image, `None` for categories built in memory.
    /// Informational only; the generator always recomputes it.
    pub declared_size: Option<u16>,
    pub data: CategoryData,
}

impl Category {
    /// Creates a category that is not yet part of a model.
    pub fn new(data: CategoryData) -> Self {
        Self {
            id: CategoryId::UNASSIGNED,
            vendor_specific: false,
            declared_size: None,
            data,
        }
    }

    /// Creates an opaque category with a raw type code.
    pub fn opaque(type_code: u16, payload: Vec<u8>) -> Self {
        Self::new(CategoryData::Opaque {
            kind: CategoryType::from(type_code),
            payload,
        })
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn kind(&self) -> CategoryType {
        self.data.kind()
    }

    /// Size in words the generator will write for this category.
    pub fn size_words(&self) -> usize {
        self.data.encoded_len().div_ceil(SII_WORD)
    }

    pub fn header(&self) -> CategoryHeader {
        CategoryHeader {
            kind: self.kind(),
            vendor_specific: self.vendor_specific,
            size: u16::try_from(self.size_words()).unwrap_or(u16::MAX),
        }
    }
}

// --- Masked Reserved Regions ---

/// Splits a payload into its reserved remainder: every bit covered by `mask`
/// is cleared, everything else is kept verbatim. Bytes past the mask are reserved.
pub(crate) fn reserved_bits(payload: &[u8], mask: &[u8]) -> Vec<u8> {
    payload
        .iter()
        .enumerate()
        .map(|(i, byte)| byte & !mask.get(i).copied().unwrap_or(0))
        .collect()
}

/// Builds the base buffer for a fixed record: the reserved remainder with all
/// named bits cleared, at least `min_len` bytes long.
pub(crate) fn reserved_base(reserved: &[u8], mask: &[u8], min_len: usize) -> Vec<u8> {
    let mut base = vec![0u8; reserved.len().max(min_len)];
    for (i, byte) in reserved.iter().enumerate() {
        base[i] = byte & !mask.get(i).copied().unwrap_or(0);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_word_split() {
        let header = CategoryHeader::from_word(0x8032, 4).unwrap();
        assert_eq!(header.kind, CategoryType::TxPdo);
        assert!(header.vendor_specific);
        assert_eq!(header.payload_len(), 8);
        assert_eq!(header.to_word(), 0x8032);
        assert!(CategoryHeader::from_word(0xFFFF, 0).is_none());
    }

    #[test]
    fn test_reserved_helpers() {
        let mask = [0xFF, 0x0F];
        assert_eq!(reserved_bits(&[0x12, 0x34, 0x56], &mask), [0x00, 0x30, 0x56]);
        assert_eq!(reserved_base(&[0x12, 0x34], &mask, 4), [0x00, 0x30, 0x00, 0x00]);
    }

    #[test]
    fn test_size_words_rounds_up() {
        let category = Category::opaque(0x0800, vec![1, 2, 3]);
        assert_eq!(category.size_words(), 2);
        assert_eq!(category.kind(), CategoryType::Other(0x0800));
    }
}
