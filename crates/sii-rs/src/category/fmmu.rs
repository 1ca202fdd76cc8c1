// crates/sii-rs/src/category/fmmu.rs

use super::{CategoryCodec, CategoryHeader};
use crate::cursor::Cursor;
use crate::error::MalformedCategory;
use crate::SiiError;
use alloc::vec::Vec;

/// Intended use of an FMMU. (Reference: ETG.1000.6, Table 23)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FmmuUsage {
    #[default]
    Unused,
    Outputs,
    Inputs,
    SyncManagerStatus,
    /// Any other value, kept verbatim.
    Other(u8),
}

impl From<u8> for FmmuUsage {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Unused,
            1 => Self::Outputs,
            2 => Self::Inputs,
            3 => Self::SyncManagerStatus,
            other => Self::Other(other),
        }
    }
}

impl From<FmmuUsage> for u8 {
    fn from(usage: FmmuUsage) -> Self {
        match usage {
            FmmuUsage::Unused => 0,
            FmmuUsage::Outputs => 1,
            FmmuUsage::Inputs => 2,
            FmmuUsage::SyncManagerStatus => 3,
            FmmuUsage::Other(value) => value,
        }
    }
}

/// One FMMU record. `id` is its position in the category and is not serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fmmu {
    pub id: usize,
    pub usage: FmmuUsage,
}

/// FMMU usage list (type 40), one byte per FMMU.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FmmuCategory {
    pub fmmus: Vec<Fmmu>,
}

impl FmmuCategory {
    /// Builds the list from usages, numbering them in order.
    pub fn from_usages<I: IntoIterator<Item = FmmuUsage>>(usages: I) -> Self {
        Self {
            fmmus: usages
                .into_iter()
                .enumerate()
                .map(|(id, usage)| Fmmu { id, usage })
                .collect(),
        }
    }
}

impl CategoryCodec for FmmuCategory {
    /// Every byte is a record, so a word-sized payload always decodes. A pad
    /// byte shows up as a trailing `Unused` entry.
    fn decode(_header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory> {
        Ok(Self::from_usages(payload.iter().copied().map(FmmuUsage::from)))
    }

    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError> {
        for fmmu in &self.fmmus {
            cursor.write_u8(fmmu.usage.into())?;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.fmmus.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryType;

    #[test]
    fn test_decode_assigns_ids() {
        let header = CategoryHeader {
            kind: CategoryType::Fmmu,
            vendor_specific: false,
            size: 2,
        };
        let fmmus = FmmuCategory::decode(&header, &[0x01, 0x02, 0x03, 0x09]).unwrap();
        assert_eq!(fmmus.fmmus.len(), 4);
        assert_eq!(fmmus.fmmus[2].id, 2);
        assert_eq!(fmmus.fmmus[2].usage, FmmuUsage::SyncManagerStatus);
        assert_eq!(fmmus.fmmus[3].usage, FmmuUsage::Other(9));

        let mut out = [0u8; 4];
        fmmus.encode(&mut Cursor::new(&mut out[..])).unwrap();
        assert_eq!(out, [0x01, 0x02, 0x03, 0x09]);
    }
}
