// crates/sii-rs-esi/src/types.rs

//! Public option type and the CoE data type table shared by parser and builder.

use alloc::string::String;
use sii_rs::EepromSizeUnit;

/// Controls how an ESI file is mapped to and from a category model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EsiOptions {
    /// Index of the `<Device>` to load when the file describes several.
    pub device: usize,
    /// Unit used to convert between `<ByteSize>` and the declared EEPROM size.
    pub size_unit: EepromSizeUnit,
    /// Written to `<Vendor><Name>`; an SII image carries no vendor name.
    pub vendor_name: Option<String>,
}

impl EsiOptions {
    pub fn with_device(mut self, device: usize) -> Self {
        self.device = device;
        self
    }

    pub fn with_size_unit(mut self, size_unit: EepromSizeUnit) -> Self {
        self.size_unit = size_unit;
        self
    }

    pub fn with_vendor_name(mut self, name: impl Into<String>) -> Self {
        self.vendor_name = Some(name.into());
        self
    }
}

// --- PDO Attribute Mapping ---

/// SII PDO flag set for `<TxPdo Mandatory="1">`.
pub const PDO_FLAG_MANDATORY: u16 = 0x0001;

/// SII PDO flag set for `<TxPdo Fixed="1">`.
pub const PDO_FLAG_FIXED: u16 = 0x0010;

/// SyncManager number of a PDO without an `Sm` attribute.
pub const PDO_NO_SYNC_MANAGER: u8 = 0xFF;

// --- Data Types ---

/// CoE base data types by SII code. (Reference: ETG.1000.6, Table 64)
const DATA_TYPES: &[(u8, &str)] = &[
    (0x01, "BOOL"),
    (0x02, "SINT"),
    (0x03, "INT"),
    (0x04, "DINT"),
    (0x05, "USINT"),
    (0x06, "UINT"),
    (0x07, "UDINT"),
    (0x08, "REAL"),
    (0x09, "STRING"),
    (0x0A, "OCTET_STRING"),
    (0x0B, "UNICODE_STRING"),
    (0x11, "LREAL"),
    (0x15, "LINT"),
    (0x1B, "ULINT"),
    (0x1E, "BYTE"),
    (0x1F, "WORD"),
    (0x20, "DWORD"),
    (0x30, "BIT1"),
    (0x31, "BIT2"),
    (0x32, "BIT3"),
    (0x33, "BIT4"),
    (0x34, "BIT5"),
    (0x35, "BIT6"),
    (0x36, "BIT7"),
    (0x37, "BIT8"),
];

/// ESI name of a data type code.
pub fn data_type_name(code: u8) -> Option<&'static str> {
    DATA_TYPES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Data type code of an ESI name. `BIT` and `BOOLEAN` are accepted as
/// aliases of `BOOL`, `STRING(n)` as `STRING`.
pub fn data_type_code(name: &str) -> Option<u8> {
    let name = name.trim();
    let base = match name.find('(') {
        Some(paren) => &name[..paren],
        None => name,
    };
    match base {
        "BIT" | "BOOLEAN" => Some(0x01),
        _ => DATA_TYPES
            .iter()
            .find(|(_, n)| *n == base)
            .map(|(code, _)| *code),
    }
}
