use core::fmt;

// --- EEPROM Constants (ETG.1000.6, Section 5.4) ---

/// Size of an EEPROM word in bytes. Category sizes are counted in words.
pub const SII_WORD: usize = 2;

/// Number of preamble bytes covered by the checksum (words 0x0000-0x0006).
pub const PREAMBLE_CHECKSUM_SPAN: usize = 14;

/// CRC-8 generator polynomial x^8 + x^2 + x^1 + 1.
pub const SII_CRC_POLY: u8 = 0x07;

/// CRC-8 initial value.
pub const SII_CRC_INIT: u8 = 0xFF;

/// Header word terminating the category list.
pub const CATEGORY_END: u16 = 0xFFFF;

/// Mask of the 15-bit category type code within the header word.
pub const CATEGORY_TYPE_MASK: u16 = 0x7FFF;

/// Vendor-specific flag within the header word.
pub const CATEGORY_VENDOR_FLAG: u16 = 0x8000;

/// Size of a category header (type word + size word) in bytes.
pub const CATEGORY_HEADER_SIZE: usize = 4;

// --- Mailbox Protocol Bits (ETG.1000.6, Table 18) ---

pub const MBOX_EOE: u16 = 0x0002;
pub const MBOX_COE: u16 = 0x0004;
pub const MBOX_FOE: u16 = 0x0008;
pub const MBOX_SOE: u16 = 0x0010;
pub const MBOX_VOE: u16 = 0x0020;
/// All named mailbox protocol bits.
pub const MBOX_PROTOCOL_MASK: u16 = MBOX_EOE | MBOX_COE | MBOX_FOE | MBOX_SOE | MBOX_VOE;

// --- Category Types ---

/// Category type codes (15-bit) of the SII category area.
/// (Reference: ETG.1000.6, Table 19)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryType {
    Strings,
    General,
    Fmmu,
    SyncManager,
    TxPdo,
    RxPdo,
    DistributedClock,
    /// Any other type code. Kept as an opaque payload.
    Other(u16),
}

impl CategoryType {
    pub const STRINGS: u16 = 10;
    pub const GENERAL: u16 = 30;
    pub const FMMU: u16 = 40;
    pub const SYNC_MANAGER: u16 = 41;
    pub const TX_PDO: u16 = 50;
    pub const RX_PDO: u16 = 51;
    pub const DISTRIBUTED_CLOCK: u16 = 60;

    /// The raw 15-bit type code.
    pub fn code(self) -> u16 {
        match self {
            Self::Strings => Self::STRINGS,
            Self::General => Self::GENERAL,
            Self::Fmmu => Self::FMMU,
            Self::SyncManager => Self::SYNC_MANAGER,
            Self::TxPdo => Self::TX_PDO,
            Self::RxPdo => Self::RX_PDO,
            Self::DistributedClock => Self::DISTRIBUTED_CLOCK,
            Self::Other(code) => code & CATEGORY_TYPE_MASK,
        }
    }

    /// True for the types this crate decodes into structured data.
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<u16> for CategoryType {
    /// Builds a type from a 15-bit code. The vendor flag must already be stripped.
    fn from(code: u16) -> Self {
        match code & CATEGORY_TYPE_MASK {
            Self::STRINGS => Self::Strings,
            Self::GENERAL => Self::General,
            Self::FMMU => Self::Fmmu,
            Self::SYNC_MANAGER => Self::SyncManager,
            Self::TX_PDO => Self::TxPdo,
            Self::RX_PDO => Self::RxPdo,
            Self::DISTRIBUTED_CLOCK => Self::DistributedClock,
            other => Self::Other(other),
        }
    }
}

impl From<CategoryType> for u16 {
    fn from(kind: CategoryType) -> Self {
        kind.code()
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strings => write!(f, "Strings"),
            Self::General => write!(f, "General"),
            Self::Fmmu => write!(f, "FMMU"),
            Self::SyncManager => write!(f, "SyncManager"),
            Self::TxPdo => write!(f, "TxPDO"),
            Self::RxPdo => write!(f, "RxPDO"),
            Self::DistributedClock => write!(f, "DistributedClock"),
            Self::Other(code) => write!(f, "Unknown({code:#06x})"),
        }
    }
}

// --- EEPROM Size Interpretation ---

/// How the `eeprom_size` word of the station configuration is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EepromSizeUnit {
    /// The value is the capacity in 16-bit words. Zero means "not declared".
    #[default]
    Words,
    /// ETG convention: the value is the capacity in KiBit minus one.
    KiloBits,
}

impl EepromSizeUnit {
    /// Capacity in bytes for a raw `eeprom_size` value, `None` when undeclared.
    pub fn capacity_bytes(self, raw: u16) -> Option<usize> {
        match self {
            Self::Words if raw == 0 => None,
            Self::Words => Some(usize::from(raw) * SII_WORD),
            Self::KiloBits => Some((usize::from(raw) + 1) * 1024 / 8),
        }
    }

    /// Inverse of [`Self::capacity_bytes`], rounding up.
    pub fn raw_from_bytes(self, bytes: usize) -> u16 {
        let raw = match self {
            Self::Words => bytes.div_ceil(SII_WORD),
            Self::KiloBits => bytes.div_ceil(128).saturating_sub(1),
        };
        u16::try_from(raw).unwrap_or(u16::MAX)
    }
}
