// crates/sii-rs/src/category/general.rs

use super::{reserved_base, reserved_bits, CategoryCodec, CategoryHeader};
use crate::cursor::Cursor;
use crate::error::{MalformedCategory, MalformedReason};
use crate::SiiError;
use alloc::vec::Vec;

/// Bits of the General payload that map onto named fields.
/// Everything else is kept in [`General::reserved`].
const NAMED_MASK: [u8; General::MIN_SIZE] = [
    0xFF, 0xFF, 0xFF, 0xFF, // string indices
    0x00, // reserved
    0x3F, // CoE details
    0x01, // FoE details
    0x01, // EoE details
    0x00, 0x00, 0x00, // reserved
    0x03, // flags
    0xFF, 0xFF, // current on E-bus
    0x00, 0x00, // group index duplicate, reserved
    0xFF, 0xFF, // physical ports
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

const OFFSET_COE: usize = 5;
const OFFSET_FOE: usize = 6;
const OFFSET_EOE: usize = 7;
const OFFSET_FLAGS: usize = 11;
const OFFSET_CURRENT: usize = 12;
const OFFSET_PORTS: usize = 16;

/// Supported CoE features (byte 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CoeDetails {
    pub sdo: bool,
    pub sdo_info: bool,
    pub pdo_assign: bool,
    pub pdo_config: bool,
    pub upload_at_startup: bool,
    pub sdo_complete_access: bool,
}

impl CoeDetails {
    pub fn from_byte(byte: u8) -> Self {
        Self {
            sdo: byte & 0x01 != 0,
            sdo_info: byte & 0x02 != 0,
            pdo_assign: byte & 0x04 != 0,
            pdo_config: byte & 0x08 != 0,
            upload_at_startup: byte & 0x10 != 0,
            sdo_complete_access: byte & 0x20 != 0,
        }
    }

    pub fn to_byte(&self) -> u8 {
        [
            self.sdo,
            self.sdo_info,
            self.pdo_assign,
            self.pdo_config,
            self.upload_at_startup,
            self.sdo_complete_access,
        ]
        .iter()
        .enumerate()
        .fold(0u8, |acc, (bit, set)| if *set { acc | (1 << bit) } else { acc })
    }
}

/// Media of a physical port, one nibble per port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortType {
    #[default]
    NotUsed,
    /// Media independent interface.
    Mii,
    Reserved,
    Ebus,
    /// Any other nibble value, kept verbatim.
    Other(u8),
}

impl PortType {
    pub fn from_nibble(nibble: u8) -> Self {
        match nibble & 0x0F {
            0 => Self::NotUsed,
            1 => Self::Mii,
            2 => Self::Reserved,
            3 => Self::Ebus,
            other => Self::Other(other),
        }
    }

    pub fn to_nibble(self) -> u8 {
        match self {
            Self::NotUsed => 0,
            Self::Mii => 1,
            Self::Reserved => 2,
            Self::Ebus => 3,
            Self::Other(value) => value & 0x0F,
        }
    }
}

/// Device identity and capabilities (type 30).
/// (Reference: ETG.1000.6, Table 21)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct General {
    pub group_index: u8,
    pub image_index: u8,
    pub order_index: u8,
    pub name_index: u8,
    pub coe: CoeDetails,
    pub foe: bool,
    pub eoe: bool,
    pub safe_op: bool,
    pub not_lrw: bool,
    /// Current consumption on the E-bus in mA. Negative values feed current in.
    pub current_on_ebus: i16,
    pub ports: [PortType; 4],
    /// The payload with every named bit cleared. Its length is the payload
    /// length; an empty vector stands for a zeroed 32-byte record.
    pub reserved: Vec<u8>,
}

impl General {
    /// Size of the fixed record in bytes.
    pub const MIN_SIZE: usize = 32;

    /// String indices referenced by this category.
    pub fn string_refs(&self) -> [u8; 4] {
        [
            self.group_index,
            self.image_index,
            self.order_index,
            self.name_index,
        ]
    }

    /// True if any reserved bit is set.
    pub fn reserved_nonzero(&self) -> bool {
        self.reserved.iter().any(|b| *b != 0)
    }
}

impl CategoryCodec for General {
    fn decode(header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory> {
        if payload.len() < Self::MIN_SIZE {
            return Err(header.malformed(
                0,
                MalformedReason::TooShort {
                    minimum: Self::MIN_SIZE,
                    actual: payload.len(),
                },
            ));
        }

        let ports = u16::from_le_bytes([payload[OFFSET_PORTS], payload[OFFSET_PORTS + 1]]);
        Ok(Self {
            group_index: payload[0],
            image_index: payload[1],
            order_index: payload[2],
            name_index: payload[3],
            coe: CoeDetails::from_byte(payload[OFFSET_COE]),
            foe: payload[OFFSET_FOE] & 0x01 != 0,
            eoe: payload[OFFSET_EOE] & 0x01 != 0,
            safe_op: payload[OFFSET_FLAGS] & 0x01 != 0,
            not_lrw: payload[OFFSET_FLAGS] & 0x02 != 0,
            current_on_ebus: i16::from_le_bytes([
                payload[OFFSET_CURRENT],
                payload[OFFSET_CURRENT + 1],
            ]),
            ports: core::array::from_fn(|port| PortType::from_nibble((ports >> (port * 4)) as u8)),
            reserved: reserved_bits(payload, &NAMED_MASK),
        })
    }

    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError> {
        let mut out = reserved_base(&self.reserved, &NAMED_MASK, Self::MIN_SIZE);
        out[..4].copy_from_slice(&self.string_refs());
        out[OFFSET_COE] |= self.coe.to_byte();
        out[OFFSET_FOE] |= u8::from(self.foe);
        out[OFFSET_EOE] |= u8::from(self.eoe);
        out[OFFSET_FLAGS] |= u8::from(self.safe_op) | (u8::from(self.not_lrw) << 1);
        out[OFFSET_CURRENT..OFFSET_CURRENT + 2]
            .copy_from_slice(&self.current_on_ebus.to_le_bytes());
        let ports = self
            .ports
            .iter()
            .enumerate()
            .fold(0u16, |acc, (port, kind)| {
                acc | (u16::from(kind.to_nibble()) << (port * 4))
            });
        out[OFFSET_PORTS..OFFSET_PORTS + 2].copy_from_slice(&ports.to_le_bytes());
        cursor.write_bytes(&out)
    }

    fn encoded_len(&self) -> usize {
        self.reserved.len().max(Self::MIN_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryType;
    use alloc::vec;

    fn header() -> CategoryHeader {
        CategoryHeader {
            kind: CategoryType::General,
            vendor_specific: false,
            size: 16,
        }
    }

    fn sample_payload() -> Vec<u8> {
        let mut payload = vec![0u8; 32];
        payload[..4].copy_from_slice(&[2, 3, 1, 4]);
        payload[5] = 0x23; // SDO, SDO info, complete access
        payload[6] = 0x01;
        payload[11] = 0x02;
        payload[12..14].copy_from_slice(&(-50i16).to_le_bytes());
        payload[16..18].copy_from_slice(&[0x11, 0x00]); // MII, MII
        payload
    }

    #[test]
    fn test_decode_named_fields() {
        let general = General::decode(&header(), &sample_payload()).unwrap();
        assert_eq!(general.string_refs(), [2, 3, 1, 4]);
        assert!(general.coe.sdo && general.coe.sdo_info && general.coe.sdo_complete_access);
        assert!(!general.coe.pdo_assign);
        assert!(general.foe && !general.eoe);
        assert!(!general.safe_op && general.not_lrw);
        assert_eq!(general.current_on_ebus, -50);
        assert_eq!(
            general.ports,
            [PortType::Mii, PortType::Mii, PortType::NotUsed, PortType::NotUsed]
        );
        assert!(!general.reserved_nonzero());
    }

    #[test]
    fn test_reserved_bits_survive() {
        let mut payload = sample_payload();
        payload[5] |= 0x80;
        payload[11] |= 0x04; // mailbox DLL flag, not a named field here
        payload[20] = 0x5A;
        let general = General::decode(&header(), &payload).unwrap();
        assert!(general.reserved_nonzero());
        assert_eq!(general.reserved[5], 0x80);
        assert_eq!(general.reserved[11], 0x04);

        let mut out = vec![0u8; general.encoded_len()];
        general.encode(&mut Cursor::new(&mut out[..])).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn test_named_fields_override_reserved() {
        let mut general = General {
            reserved: vec![0xFF; 34],
            ..Default::default()
        };
        general.eoe = true;
        let mut out = vec![0u8; general.encoded_len()];
        general.encode(&mut Cursor::new(&mut out[..])).unwrap();
        assert_eq!(out.len(), 34);
        // Named bits come from the fields, not from the stale reserved copy.
        assert_eq!(out[0], 0x00);
        assert_eq!(out[5], 0xC0);
        assert_eq!(out[7], 0xFF);
        assert_eq!(out[33], 0xFF);
    }

    #[test]
    fn test_short_payload_is_malformed() {
        let err = General::decode(&header(), &[0u8; 30]).unwrap_err();
        assert_eq!(
            err.reason,
            MalformedReason::TooShort {
                minimum: 32,
                actual: 30
            }
        );
    }

    #[test]
    fn test_port_nibbles() {
        let general = General {
            ports: [PortType::Ebus, PortType::Other(7), PortType::Reserved, PortType::Mii],
            ..Default::default()
        };
        let mut out = [0u8; 32];
        general.encode(&mut Cursor::new(&mut out[..])).unwrap();
        assert_eq!(&out[16..18], &[0x73, 0x12]);
    }
}
