// crates/sii-rs/tests/common/mod.rs

//! Builds SII images byte by byte, independent of the crate's generator.
#![allow(dead_code)]

use sii_rs::header::checksum;

pub const STRINGS: u16 = 10;
pub const GENERAL: u16 = 30;
pub const FMMU: u16 = 40;
pub const SYNC_MANAGER: u16 = 41;
pub const TX_PDO: u16 = 50;
pub const RX_PDO: u16 = 51;
pub const DCLOCK: u16 = 60;

/// An image under construction. The fixed header starts zeroed except for a
/// declared size of 0x1000 words and version 1.
pub struct ImageBuilder {
    header: [u8; 128],
    body: Vec<u8>,
    stored_checksum: Option<u16>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        let mut header = [0u8; 128];
        header[0x7C..0x7E].copy_from_slice(&0x1000u16.to_le_bytes());
        header[0x7E..0x80].copy_from_slice(&1u16.to_le_bytes());
        Self {
            header,
            body: Vec::new(),
            stored_checksum: None,
        }
    }

    /// Fills in a typical coupler identity and standard mailboxes.
    pub fn typical() -> Self {
        Self::new()
            .u16_at(0x00, 0x0C80)
            .u16_at(0x02, 0xE088)
            .u32_at(0x10, 0x0000_0002)
            .u32_at(0x14, 0x044C_2C52)
            .u32_at(0x18, 0x0011_0000)
            .mailbox(0x30, 0x1000, 0x0080)
            .mailbox(0x34, 0x1080, 0x0080)
            .u16_at(0x38, 0x000C)
    }

    pub fn u16_at(mut self, offset: usize, value: u16) -> Self {
        self.header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32_at(mut self, offset: usize, value: u32) -> Self {
        self.header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn mailbox(self, offset: usize, start: u16, size: u16) -> Self {
        self.u16_at(offset, start).u16_at(offset + 2, size)
    }

    pub fn eeprom_size(self, words: u16) -> Self {
        self.u16_at(0x7C, words)
    }

    /// Stores this value instead of the correct checksum.
    pub fn stored_checksum(mut self, value: u16) -> Self {
        self.stored_checksum = Some(value);
        self
    }

    /// Appends a category with the given header word, padding odd payloads.
    pub fn category(mut self, word: u16, payload: &[u8]) -> Self {
        let words = payload.len().div_ceil(2) as u16;
        self.body.extend_from_slice(&word.to_le_bytes());
        self.body.extend_from_slice(&words.to_le_bytes());
        self.body.extend_from_slice(payload);
        if payload.len() % 2 != 0 {
            self.body.push(0);
        }
        self
    }

    /// Appends raw bytes to the category area.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn end(self) -> Self {
        self.raw(&[0xFF, 0xFF])
    }

    pub fn build(mut self) -> Vec<u8> {
        let computed = u16::from(checksum(&self.header[..14]));
        let stored = self.stored_checksum.unwrap_or(computed);
        self.header[14..16].copy_from_slice(&stored.to_le_bytes());
        let mut image = self.header.to_vec();
        image.extend_from_slice(&self.body);
        image
    }
}

// --- Payload helpers ---

pub fn strings(texts: &[&str]) -> Vec<u8> {
    let mut payload = vec![texts.len() as u8];
    for text in texts {
        payload.push(text.len() as u8);
        payload.extend_from_slice(text.as_bytes());
    }
    payload
}

/// A 32-byte General payload with the given string indices, CoE with SDO info
/// and two E-bus ports.
pub fn general(group: u8, image: u8, order: u8, name: u8) -> Vec<u8> {
    let mut payload = vec![0u8; 32];
    payload[..4].copy_from_slice(&[group, image, order, name]);
    payload[5] = 0x03;
    payload[12..14].copy_from_slice(&130i16.to_le_bytes());
    payload[16..18].copy_from_slice(&[0x33, 0x00]);
    payload
}

pub fn sync_manager(address: u16, length: u16, control: u8, enable: u8, kind: u8) -> [u8; 8] {
    let a = address.to_le_bytes();
    let l = length.to_le_bytes();
    [a[0], a[1], l[0], l[1], control, 0, enable, kind]
}

/// A PDO header declaring `declared` entries, followed by the given
/// `(subindex, data type, bit length)` entries of object 0x6000.
pub fn pdo(index: u16, declared: u8, sm: u8, name: u8, entries: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&index.to_le_bytes());
    payload.extend_from_slice(&[declared, sm, 0, name, 0, 0]);
    for (subindex, data_type, bit_length) in entries {
        payload.extend_from_slice(&[0x00, 0x60, *subindex, 0, *data_type, *bit_length, 0, 0]);
    }
    payload
}
