// crates/sii-rs/src/header/preamble.rs

use crate::cursor::Cursor;
use crate::types::{PREAMBLE_CHECKSUM_SPAN, SII_CRC_INIT, SII_CRC_POLY};
use crate::SiiError;

/// The fixed 16-byte configuration block at EEPROM word 0.
/// (Reference: ETG.1000.6, Table 16, words 0x0000-0x0007)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preamble {
    pub pdi_control: u16,
    pub pdi_config: u16,
    pub sync_impulse_len: u16,
    pub pdi_config2: u16,
    pub station_alias: u16,
    /// Shall be zero.
    pub reserved: [u8; 4],
    /// Checksum as found in the decoded image, `None` for a preamble built in memory.
    /// Never written back; the generator always recomputes it.
    pub stored_checksum: Option<u16>,
}

impl Preamble {
    /// Size of the preamble in bytes, including the checksum word.
    pub const SIZE: usize = 16;

    /// Decodes the preamble and verifies its checksum.
    ///
    /// On a mismatch the fully decoded preamble is returned inside
    /// [`SiiError::ChecksumMismatch`].
    pub fn decode<B: AsRef<[u8]>>(cursor: &mut Cursor<B>) -> Result<Self, SiiError> {
        let start = cursor.position();
        let data: [u8; PREAMBLE_CHECKSUM_SPAN] = cursor.read_array()?;
        let stored = cursor.read_u16()?;
        let computed = checksum(&data);

        let preamble = Preamble {
            stored_checksum: Some(stored),
            ..Self::from_data_bytes(&data)
        };

        if stored != u16::from(computed) {
            log::debug!(
                "Preamble at {:#06x}: stored checksum {:#06x}, computed {:#04x}",
                start,
                stored,
                computed
            );
            return Err(SiiError::ChecksumMismatch {
                stored,
                computed,
                preamble,
            });
        }
        Ok(preamble)
    }

    /// Encodes the 14 data bytes followed by a freshly computed checksum.
    pub fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(
        &self,
        cursor: &mut Cursor<B>,
    ) -> Result<(), SiiError> {
        let data = self.data_bytes();
        cursor.write_bytes(&data)?;
        cursor.write_u16(u16::from(checksum(&data)))
    }

    /// The checksum the generator would write for this preamble.
    pub fn computed_checksum(&self) -> u8 {
        checksum(&self.data_bytes())
    }

    /// True if a stored checksum exists and differs from the computed one.
    pub fn checksum_mismatch(&self) -> bool {
        self.stored_checksum
            .is_some_and(|stored| stored != u16::from(self.computed_checksum()))
    }

    /// Builds a preamble from the 14 bytes covered by the checksum.
    pub fn from_data_bytes(data: &[u8; PREAMBLE_CHECKSUM_SPAN]) -> Self {
        let word = |at: usize| u16::from_le_bytes([data[at], data[at + 1]]);
        Self {
            pdi_control: word(0),
            pdi_config: word(2),
            sync_impulse_len: word(4),
            pdi_config2: word(6),
            station_alias: word(8),
            reserved: [data[10], data[11], data[12], data[13]],
            stored_checksum: None,
        }
    }

    /// The 14 bytes covered by the checksum.
    pub fn data_bytes(&self) -> [u8; PREAMBLE_CHECKSUM_SPAN] {
        let mut data = [0u8; PREAMBLE_CHECKSUM_SPAN];
        data[0..2].copy_from_slice(&self.pdi_control.to_le_bytes());
        data[2..4].copy_from_slice(&self.pdi_config.to_le_bytes());
        data[4..6].copy_from_slice(&self.sync_impulse_len.to_le_bytes());
        data[6..8].copy_from_slice(&self.pdi_config2.to_le_bytes());
        data[8..10].copy_from_slice(&self.station_alias.to_le_bytes());
        data[10..14].copy_from_slice(&self.reserved);
        data
    }
}

/// CRC-8 with polynomial x^8 + x^2 + x + 1 and initial value 0xFF,
/// MSB first, no final xor.
pub fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(SII_CRC_INIT, |crc, &byte| {
        let mut crc = crc ^ byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ SII_CRC_POLY
            } else {
                crc << 1
            };
        }
        crc
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Preamble {
        Preamble {
            pdi_control: 0x0C80,
            pdi_config: 0xE088,
            sync_impulse_len: 0,
            pdi_config2: 0,
            station_alias: 0,
            reserved: [0; 4],
            stored_checksum: None,
        }
    }

    #[test]
    fn test_checksum_check_value() {
        // Check value of this CRC-8 parametrization.
        assert_eq!(checksum(b"123456789"), 0xFB);
        assert_eq!(checksum(&[0u8; 14]), 0x30);
    }

    #[test]
    fn test_encode_writes_fresh_checksum() {
        let mut preamble = sample();
        preamble.stored_checksum = Some(0xBEEF);
        let mut buf = [0u8; Preamble::SIZE];
        preamble.encode(&mut Cursor::new(&mut buf[..])).unwrap();
        assert_eq!(&buf[0..4], &[0x80, 0x0C, 0x88, 0xE0]);
        assert_eq!(&buf[14..16], &[0x36, 0x00]);
    }

    #[test]
    fn test_checksum_law() {
        let preamble = Preamble {
            station_alias: 0x1234,
            reserved: [0, 1, 2, 3],
            ..sample()
        };
        let mut buf = [0u8; Preamble::SIZE];
        preamble.encode(&mut Cursor::new(&mut buf[..])).unwrap();
        let decoded = Preamble::decode(&mut Cursor::new(&buf[..])).unwrap();
        assert_eq!(decoded.station_alias, 0x1234);
        assert_eq!(decoded.reserved, [0, 1, 2, 3]);
        assert!(!decoded.checksum_mismatch());
    }

    #[test]
    fn test_decode_reports_mismatch_with_degraded_preamble() {
        let mut buf = [0u8; Preamble::SIZE];
        sample().encode(&mut Cursor::new(&mut buf[..])).unwrap();
        buf[14] ^= 0xFF;
        match Preamble::decode(&mut Cursor::new(&buf[..])) {
            Err(SiiError::ChecksumMismatch {
                stored,
                computed,
                preamble,
            }) => {
                assert_eq!(computed, 0x36);
                assert_eq!(stored, 0x00C9);
                assert_eq!(preamble.pdi_control, 0x0C80);
                assert!(preamble.checksum_mismatch());
            }
            other => panic!("Expected ChecksumMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_data_bytes_match_encoded_layout() {
        let preamble = Preamble {
            station_alias: 0x0102,
            ..sample()
        };
        let data = preamble.data_bytes();
        assert_eq!(&data[8..10], &[0x02, 0x01]);
        assert_eq!(Preamble::from_data_bytes(&data), preamble);
    }

    #[test]
    fn test_decode_short_buffer() {
        let buf = [0u8; 10];
        assert!(matches!(
            Preamble::decode(&mut Cursor::new(&buf[..])),
            Err(SiiError::TruncatedInput { .. })
        ));
    }
}
