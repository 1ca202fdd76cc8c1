// crates/sii-rs/src/category/pdo.rs

use super::{CategoryCodec, CategoryHeader};
use crate::cursor::Cursor;
use crate::error::{GenerationError, MalformedCategory, MalformedReason};
use crate::types::CategoryType;
use crate::SiiError;
use alloc::vec::Vec;

/// Process data direction, as seen from the slave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdoDirection {
    /// Inputs sent by the slave (category 50).
    Tx,
    /// Outputs received by the slave (category 51).
    Rx,
}

impl PdoDirection {
    pub fn category_type(self) -> CategoryType {
        match self {
            Self::Tx => CategoryType::TxPdo,
            Self::Rx => CategoryType::RxPdo,
        }
    }

    pub fn from_category_type(kind: CategoryType) -> Option<Self> {
        match kind {
            CategoryType::TxPdo => Some(Self::Tx),
            CategoryType::RxPdo => Some(Self::Rx),
            _ => None,
        }
    }
}

/// One mapped object of a PDO. (Reference: ETG.1000.6, Table 26)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PdoEntry {
    pub index: u16,
    pub subindex: u8,
    pub name_index: u8,
    pub data_type: u8,
    pub bit_length: u8,
    pub flags: u16,
}

impl PdoEntry {
    pub const SIZE: usize = 8;
}

/// A PDO header with its entries. The entry count is not stored; it is
/// derived from `entries` on encode. (Reference: ETG.1000.6, Table 25)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pdo {
    pub index: u16,
    pub sync_manager: u8,
    pub dc_sync: u8,
    pub name_index: u8,
    pub flags: u16,
    pub entries: Vec<PdoEntry>,
}

impl Pdo {
    /// Size of the PDO header in bytes.
    pub const HEADER_SIZE: usize = 8;

    pub fn encoded_len(&self) -> usize {
        Self::HEADER_SIZE + self.entries.len() * PdoEntry::SIZE
    }

    /// Total mapped length in bits.
    pub fn bit_length(&self) -> u32 {
        self.entries.iter().map(|e| u32::from(e.bit_length)).sum()
    }
}

/// TxPDO or RxPDO category (types 50 and 51).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdoCategory {
    pub direction: PdoDirection,
    pub pdos: Vec<Pdo>,
}

impl PdoCategory {
    pub fn new(direction: PdoDirection) -> Self {
        Self {
            direction,
            pdos: Vec::new(),
        }
    }

    /// String indices referenced by the PDOs and their entries.
    pub fn string_refs(&self) -> impl Iterator<Item = u8> + '_ {
        self.pdos.iter().flat_map(|pdo| {
            core::iter::once(pdo.name_index).chain(pdo.entries.iter().map(|e| e.name_index))
        })
    }
}

impl CategoryCodec for PdoCategory {
    fn decode(header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory> {
        let direction = PdoDirection::from_category_type(header.kind).unwrap_or(PdoDirection::Tx);
        let mut cursor = Cursor::new(payload);
        let mut pdos = Vec::new();

        while cursor.remaining() > 0 {
            let offset = cursor.position();
            let record = match cursor.read_array::<{ Pdo::HEADER_SIZE }>() {
                Ok(record) => record,
                Err(_) => {
                    return Err(header.malformed(
                        offset,
                        MalformedReason::PartialRecord {
                            record_size: Pdo::HEADER_SIZE,
                            remaining: cursor.remaining(),
                        },
                    ));
                }
            };
            let index = u16::from_le_bytes([record[0], record[1]]);
            let declared = record[2];
            let present = cursor.remaining() / PdoEntry::SIZE;
            if present < usize::from(declared) {
                return Err(header.malformed(
                    offset,
                    MalformedReason::PdoEntryCount {
                        pdo_index: index,
                        declared,
                        present,
                    },
                ));
            }

            let mut entries = Vec::with_capacity(usize::from(declared));
            for _ in 0..declared {
                let entry: [u8; PdoEntry::SIZE] = cursor
                    .read_array()
                    .map_err(|_| header.malformed(offset, MalformedReason::PdoEntryCount {
                        pdo_index: index,
                        declared,
                        present,
                    }))?;
                entries.push(PdoEntry {
                    index: u16::from_le_bytes([entry[0], entry[1]]),
                    subindex: entry[2],
                    name_index: entry[3],
                    data_type: entry[4],
                    bit_length: entry[5],
                    flags: u16::from_le_bytes([entry[6], entry[7]]),
                });
            }

            pdos.push(Pdo {
                index,
                sync_manager: record[3],
                dc_sync: record[4],
                name_index: record[5],
                flags: u16::from_le_bytes([record[6], record[7]]),
                entries,
            });
        }
        Ok(Self { direction, pdos })
    }

    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError> {
        for pdo in &self.pdos {
            let count =
                u8::try_from(pdo.entries.len()).map_err(|_| GenerationError::TooManyRecords {
                    category: 0,
                    count: pdo.entries.len(),
                })?;
            cursor.write_u16(pdo.index)?;
            cursor.write_u8(count)?;
            cursor.write_u8(pdo.sync_manager)?;
            cursor.write_u8(pdo.dc_sync)?;
            cursor.write_u8(pdo.name_index)?;
            cursor.write_u16(pdo.flags)?;
            for entry in &pdo.entries {
                cursor.write_u16(entry.index)?;
                cursor.write_u8(entry.subindex)?;
                cursor.write_u8(entry.name_index)?;
                cursor.write_u8(entry.data_type)?;
                cursor.write_u8(entry.bit_length)?;
                cursor.write_u16(entry.flags)?;
            }
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.pdos.iter().map(Pdo::encoded_len).sum()
    }

    fn check(&self, category: usize) -> Result<(), GenerationError> {
        match self
            .pdos
            .iter()
            .find(|pdo| pdo.entries.len() > usize::from(u8::MAX))
        {
            Some(pdo) => Err(GenerationError::TooManyRecords {
                category,
                count: pdo.entries.len(),
            }),
            None => Ok(()),
        }
    }
}
