// crates/sii-rs/src/category/dclock.rs

use super::{reserved_base, reserved_bits, CategoryCodec, CategoryHeader};
use crate::cursor::Cursor;
use crate::error::{MalformedCategory, MalformedReason};
use crate::SiiError;
use alloc::vec::Vec;

/// Named bits of the 72-byte record; the rest is kept in
/// [`DistributedClock::reserved`].
const NAMED_MASK: [u8; DistributedClock::MIN_SIZE] = [
    0x00, 0x07, // activation word, bits 8-10
    0xFF, 0xFF, // sync pulse length
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // reserved
    0x01, 0x01, // interrupt status
    0xFF, 0xFF, 0xFF, 0xFF, // cyclic operation start time
    0xFF, 0xFF, 0xFF, 0xFF, // SYNC0 cycle time
    0xFF, 0xFF, 0xFF, 0xFF, // SYNC1 cycle time
    0x03, 0x00, 0x03, 0x00, // latch edges
    0x00, 0x00, 0x00, 0x00, // reserved
    0x03, 0x03, 0x00, 0x00, // latch events
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, // latch 0 positive edge value
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, // latch 0 negative edge value
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, // latch 1 positive edge value
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, // latch 1 negative edge value
];

const ACTIVATION_MASK: u16 = 0x0700;
const CYCLIC_OP: u16 = 0x0100;
const SYNC0: u16 = 0x0200;
const SYNC1: u16 = 0x0400;

/// Configuration of one latch unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatchConfig {
    pub positive_edge: bool,
    pub negative_edge: bool,
    pub positive_event: bool,
    pub negative_event: bool,
    pub positive_edge_value: u32,
    pub negative_edge_value: u32,
}

impl LatchConfig {
    fn read(payload: &[u8], edge: usize, event: usize, values: usize) -> Self {
        Self {
            positive_edge: payload[edge] & 0x01 != 0,
            negative_edge: payload[edge] & 0x02 != 0,
            positive_event: payload[event] & 0x01 != 0,
            negative_event: payload[event] & 0x02 != 0,
            positive_edge_value: read_u32(payload, values),
            negative_edge_value: read_u32(payload, values + 8),
        }
    }

    fn write(&self, out: &mut [u8], edge: usize, event: usize, values: usize) {
        out[edge] |= u8::from(self.positive_edge) | (u8::from(self.negative_edge) << 1);
        out[event] |= u8::from(self.positive_event) | (u8::from(self.negative_event) << 1);
        out[values..values + 4].copy_from_slice(&self.positive_edge_value.to_le_bytes());
        out[values + 8..values + 12].copy_from_slice(&self.negative_edge_value.to_le_bytes());
    }
}

/// Distributed clock settings (type 60).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DistributedClock {
    pub cyclic_op_enabled: bool,
    pub sync0_active: bool,
    pub sync1_active: bool,
    pub sync_pulse: u16,
    pub int0_status: bool,
    pub int1_status: bool,
    /// Start time of cyclic operation in ns.
    pub cyclic_op_start_time: u32,
    /// SYNC0 cycle time in ns.
    pub sync0_cycle_time: u32,
    /// SYNC1 cycle time in ns.
    pub sync1_cycle_time: u32,
    pub latch0: LatchConfig,
    pub latch1: LatchConfig,
    /// The payload with every named bit cleared; empty for a zeroed record.
    pub reserved: Vec<u8>,
}

impl DistributedClock {
    pub const MIN_SIZE: usize = 72;

    /// The activation word (bits 8-10), as used for the ESC's
    /// cyclic unit control and the ESI `AssignActivate` value.
    pub fn activation(&self) -> u16 {
        let mut word = 0;
        if self.cyclic_op_enabled {
            word |= CYCLIC_OP;
        }
        if self.sync0_active {
            word |= SYNC0;
        }
        if self.sync1_active {
            word |= SYNC1;
        }
        word
    }

    /// Sets the named activation bits from a word. Other bits are ignored.
    pub fn set_activation(&mut self, word: u16) {
        self.cyclic_op_enabled = word & CYCLIC_OP != 0;
        self.sync0_active = word & SYNC0 != 0;
        self.sync1_active = word & SYNC1 != 0;
    }

    pub fn reserved_nonzero(&self) -> bool {
        self.reserved.iter().any(|b| *b != 0)
    }
}

impl CategoryCodec for DistributedClock {
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

        let mut dc = Self {
            sync_pulse: u16::from_le_bytes([payload[2], payload[3]]),
            int0_status: payload[14] & 0x01 != 0,
            int1_status: payload[15] & 0x01 != 0,
            cyclic_op_start_time: read_u32(payload, 16),
            sync0_cycle_time: read_u32(payload, 20),
            sync1_cycle_time: read_u32(payload, 24),
            latch0: LatchConfig::read(payload, 28, 36, 40),
            latch1: LatchConfig::read(payload, 30, 37, 56),
            reserved: reserved_bits(payload, &NAMED_MASK),
            ..Default::default()
        };
        dc.set_activation(u16::from_le_bytes([payload[0], payload[1]]) & ACTIVATION_MASK);
        Ok(dc)
    }

    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError> {
        let mut out = reserved_base(&self.reserved, &NAMED_MASK, Self::MIN_SIZE);
        let activation = self.activation().to_le_bytes();
        out[0] |= activation[0];
        out[1] |= activation[1];
        out[2..4].copy_from_slice(&self.sync_pulse.to_le_bytes());
        out[14] |= u8::from(self.int0_status);
        out[15] |= u8::from(self.int1_status);
        out[16..20].copy_from_slice(&self.cyclic_op_start_time.to_le_bytes());
        out[20..24].copy_from_slice(&self.sync0_cycle_time.to_le_bytes());
        out[24..28].copy_from_slice(&self.sync1_cycle_time.to_le_bytes());
        self.latch0.write(&mut out, 28, 36, 40);
        self.latch1.write(&mut out, 30, 37, 56);
        cursor.write_bytes(&out)
    }

    fn encoded_len(&self) -> usize {
        self.reserved.len().max(Self::MIN_SIZE)
    }
}

fn read_u32(payload: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}
