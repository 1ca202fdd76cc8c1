// crates/sii-rs/src/category/sync_manager.rs

use super::{CategoryCodec, CategoryHeader};
use crate::cursor::Cursor;
use crate::error::{MalformedCategory, MalformedReason};
use crate::SiiError;
use alloc::vec::Vec;

/// Intended use of a SyncManager. (Reference: ETG.1000.6, Table 24)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncManagerType {
    #[default]
    Unused,
    MailboxOut,
    MailboxIn,
    ProcessOut,
    ProcessIn,
    /// Any other value, kept verbatim.
    Other(u8),
}

impl From<u8> for SyncManagerType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Unused,
            1 => Self::MailboxOut,
            2 => Self::MailboxIn,
            3 => Self::ProcessOut,
            4 => Self::ProcessIn,
            other => Self::Other(other),
        }
    }
}

impl From<SyncManagerType> for u8 {
    fn from(kind: SyncManagerType) -> Self {
        match kind {
            SyncManagerType::Unused => 0,
            SyncManagerType::MailboxOut => 1,
            SyncManagerType::MailboxIn => 2,
            SyncManagerType::ProcessOut => 3,
            SyncManagerType::ProcessIn => 4,
            SyncManagerType::Other(value) => value,
        }
    }
}

/// One 8-byte SyncManager record. `id` is its position in the category and is
/// not serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncManager {
    pub id: usize,
    pub physical_address: u16,
    pub length: u16,
    /// Control register value (mode of operation).
    pub control: u8,
    pub status: u8,
    /// Bit 0 enable, bit 1 fixed content, bit 2 virtual, bit 3 OP only.
    pub enable: u8,
    pub kind: SyncManagerType,
}

impl SyncManager {
    /// Size of one record in bytes.
    pub const SIZE: usize = 8;
}

/// SyncManager configuration list (type 41).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncManagerCategory {
    pub sync_managers: Vec<SyncManager>,
}

impl CategoryCodec for SyncManagerCategory {
    fn decode(header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory> {
        let mut sync_managers = Vec::with_capacity(payload.len() / SyncManager::SIZE);
        for (id, record) in payload.chunks(SyncManager::SIZE).enumerate() {
            if record.len() < SyncManager::SIZE {
                return Err(header.malformed(
                    id * SyncManager::SIZE,
                    MalformedReason::PartialRecord {
                        record_size: SyncManager::SIZE,
                        remaining: record.len(),
                    },
                ));
            }
            sync_managers.push(SyncManager {
                id,
                physical_address: u16::from_le_bytes([record[0], record[1]]),
                length: u16::from_le_bytes([record[2], record[3]]),
                control: record[4],
                status: record[5],
                enable: record[6],
                kind: SyncManagerType::from(record[7]),
            });
        }
        Ok(Self { sync_managers })
    }

    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError> {
        for sm in &self.sync_managers {
            cursor.write_u16(sm.physical_address)?;
            cursor.write_u16(sm.length)?;
            cursor.write_u8(sm.control)?;
            cursor.write_u8(sm.status)?;
            cursor.write_u8(sm.enable)?;
            cursor.write_u8(sm.kind.into())?;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.sync_managers.len() * SyncManager::SIZE
    }
}
