// crates/sii-rs/src/header/std_config.rs

use crate::cursor::Cursor;
use crate::types::{
    EepromSizeUnit, MBOX_COE, MBOX_EOE, MBOX_FOE, MBOX_PROTOCOL_MASK, MBOX_SOE, MBOX_VOE,
};
use crate::SiiError;

/// An offset/size pair describing a mailbox region in ESC memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailboxRegion {
    pub offset: u16,
    pub size: u16,
}

impl MailboxRegion {
    /// First byte past the region, computed without overflow.
    pub fn end(&self) -> u32 {
        u32::from(self.offset) + u32::from(self.size)
    }
}

/// Identifies one of the four mailbox regions of the station configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailboxKind {
    BootstrapReceive,
    BootstrapSend,
    StandardReceive,
    StandardSend,
}

/// Supported mailbox protocols (word 0x001C).
///
/// The raw word is never cached: [`MailboxProtocols::to_word`] rebuilds it
/// from the named flags plus the masked `reserved` remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MailboxProtocols {
    pub eoe: bool,
    pub coe: bool,
    pub foe: bool,
    pub soe: bool,
    pub voe: bool,
    /// Bit 0 and bits 6-15 as found in the image. Shall be zero.
    pub reserved: u16,
}

impl MailboxProtocols {
    pub fn from_word(word: u16) -> Self {
        Self {
            eoe: word & MBOX_EOE != 0,
            coe: word & MBOX_COE != 0,
            foe: word & MBOX_FOE != 0,
            soe: word & MBOX_SOE != 0,
            voe: word & MBOX_VOE != 0,
            reserved: word & !MBOX_PROTOCOL_MASK,
        }
    }

    pub fn to_word(&self) -> u16 {
        let mut word = self.reserved & !MBOX_PROTOCOL_MASK;
        for (flag, bit) in [
            (self.eoe, MBOX_EOE),
            (self.coe, MBOX_COE),
            (self.foe, MBOX_FOE),
            (self.soe, MBOX_SOE),
            (self.voe, MBOX_VOE),
        ] {
            if flag {
                word |= bit;
            }
        }
        word
    }

    /// True if any mailbox protocol is supported.
    pub fn any(&self) -> bool {
        self.eoe || self.coe || self.foe || self.soe || self.voe
    }
}

/// The fixed station configuration block, EEPROM words 0x0008-0x003F.
/// (Reference: ETG.1000.6, Table 16)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdConfig {
    pub vendor_id: u32,
    pub product_id: u32,
    pub revision_id: u32,
    pub serial: u32,
    /// Words 0x0010-0x0013. Shall be zero.
    pub reserved_a: [u8; 8],
    pub bootstrap_receive: MailboxRegion,
    pub bootstrap_send: MailboxRegion,
    pub standard_receive: MailboxRegion,
    pub standard_send: MailboxRegion,
    pub mailbox_protocols: MailboxProtocols,
    /// Words 0x001D-0x003D. Shall be zero.
    pub reserved_b: [u8; 66],
    /// Declared EEPROM size; see [`EepromSizeUnit`] for its interpretation.
    pub eeprom_size: u16,
    pub version: u16,
}

impl Default for StdConfig {
    fn default() -> Self {
        Self {
            vendor_id: 0,
            product_id: 0,
            revision_id: 0,
            serial: 0,
            reserved_a: [0; 8],
            bootstrap_receive: MailboxRegion::default(),
            bootstrap_send: MailboxRegion::default(),
            standard_receive: MailboxRegion::default(),
            standard_send: MailboxRegion::default(),
            mailbox_protocols: MailboxProtocols::default(),
            reserved_b: [0; 66],
            eeprom_size: 0,
            version: 1,
        }
    }
}

impl StdConfig {
    /// Size of the block in bytes.
    pub const SIZE: usize = 112;

    pub fn decode<B: AsRef<[u8]>>(cursor: &mut Cursor<B>) -> Result<Self, SiiError> {
        Ok(Self {
            vendor_id: cursor.read_u32()?,
            product_id: cursor.read_u32()?,
            revision_id: cursor.read_u32()?,
            serial: cursor.read_u32()?,
            reserved_a: cursor.read_array()?,
            bootstrap_receive: read_region(cursor)?,
            bootstrap_send: read_region(cursor)?,
            standard_receive: read_region(cursor)?,
            standard_send: read_region(cursor)?,
            mailbox_protocols: MailboxProtocols::from_word(cursor.read_u16()?),
            reserved_b: cursor.read_array()?,
            eeprom_size: cursor.read_u16()?,
            version: cursor.read_u16()?,
        })
    }

    pub fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(
        &self,
        cursor: &mut Cursor<B>,
    ) -> Result<(), SiiError> {
        cursor.write_u32(self.vendor_id)?;
        cursor.write_u32(self.product_id)?;
        cursor.write_u32(self.revision_id)?;
        cursor.write_u32(self.serial)?;
        cursor.write_bytes(&self.reserved_a)?;
        for region in self.mailboxes().map(|(_, region)| region) {
            cursor.write_u16(region.offset)?;
            cursor.write_u16(region.size)?;
        }
        cursor.write_u16(self.mailbox_protocols.to_word())?;
        cursor.write_bytes(&self.reserved_b)?;
        cursor.write_u16(self.eeprom_size)?;
        cursor.write_u16(self.version)
    }

    /// The four mailbox regions in their on-EEPROM order.
    pub fn mailboxes(&self) -> [(MailboxKind, MailboxRegion); 4] {
        [
            (MailboxKind::BootstrapReceive, self.bootstrap_receive),
            (MailboxKind::BootstrapSend, self.bootstrap_send),
            (MailboxKind::StandardReceive, self.standard_receive),
            (MailboxKind::StandardSend, self.standard_send),
        ]
    }

    /// EEPROM capacity in bytes, or `None` if no size is declared.
    pub fn eeprom_capacity(&self, unit: EepromSizeUnit) -> Option<usize> {
        unit.capacity_bytes(self.eeprom_size)
    }

    /// True if any reserved byte of the block is non-zero.
    pub fn reserved_nonzero(&self) -> bool {
        self.reserved_a.iter().chain(self.reserved_b.iter()).any(|b| *b != 0)
    }
}

fn read_region<B: AsRef<[u8]>>(cursor: &mut Cursor<B>) -> Result<MailboxRegion, SiiError> {
    Ok(MailboxRegion {
        offset: cursor.read_u16()?,
        size: cursor.read_u16()?,
    })
}
