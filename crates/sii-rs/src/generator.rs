// crates/sii-rs/src/generator.rs

//! Serializes a [`CategoryModel`] back into an SII image.

use crate::category::{Category, CategoryData};
use crate::config::CodecConfig;
use crate::cursor::Cursor;
use crate::error::GenerationError;
use crate::header::FIXED_HEADER_SIZE;
use crate::model::CategoryModel;
use crate::types::{CATEGORY_END, CATEGORY_HEADER_SIZE, SII_WORD};
use crate::SiiError;
use alloc::vec;
use alloc::vec::Vec;

/// Outcome of [`BinaryGenerator::encode_into`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Number of bytes written.
    pub len: usize,
    /// Set when the image does not fit the declared EEPROM capacity.
    /// The image is still written in full.
    pub capacity_exceeded: Option<GenerationError>,
}

/// Writes the preamble with a fresh checksum, the station configuration, each
/// category with a recomputed size, the end marker and the trailer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryGenerator {
    config: CodecConfig,
}

impl BinaryGenerator {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Exact size of the image `encode` produces.
    pub fn encoded_len(&self, model: &CategoryModel) -> usize {
        FIXED_HEADER_SIZE
            + model
                .categories()
                .iter()
                .map(|c| CATEGORY_HEADER_SIZE + c.size_words() * SII_WORD)
                .sum::<usize>()
            + SII_WORD
            + model.trailer().len()
    }

    /// Checks everything that would make the image invalid, without writing.
    pub fn check(&self, model: &CategoryModel) -> Result<(), GenerationError> {
        for (index, category) in model.categories().iter().enumerate() {
            category.data.check(index)?;
            let bytes = category.data.encoded_len();
            if category.size_words() > usize::from(u16::MAX) {
                return Err(GenerationError::CategoryTooLarge {
                    category: index,
                    bytes,
                });
            }
            if let Some(string) = string_refs(category).find(|i| model.string_at(*i).is_none()) {
                return Err(GenerationError::DanglingStringIndex {
                    category: index,
                    index: string,
                });
            }
        }
        Ok(())
    }

    /// Writes the image into a caller-owned buffer.
    ///
    /// Exceeding the declared EEPROM capacity is reported in the result, not as
    /// an error. A buffer shorter than [`Self::encoded_len`] fails with
    /// [`SiiError::BufferOverflow`] before anything is written.
    pub fn encode_into(
        &self,
        model: &CategoryModel,
        out: &mut [u8],
    ) -> Result<Generated, SiiError> {
        self.check(model)?;
        let len = self.encoded_len(model);
        if out.len() < len {
            return Err(SiiError::BufferOverflow {
                offset: out.len(),
                needed: len - out.len(),
            });
        }

        let mut cursor = Cursor::new(&mut out[..len]);
        model.preamble().encode(&mut cursor)?;
        model.std_config().encode(&mut cursor)?;
        for category in model.categories() {
            let header = category.header();
            cursor.write_u16(header.to_word())?;
            cursor.write_u16(header.size)?;
            category.data.encode(&mut cursor)?;
            if category.data.encoded_len() % SII_WORD != 0 {
                cursor.write_u8(0)?;
            }
        }
        cursor.write_u16(CATEGORY_END)?;
        cursor.write_bytes(model.trailer())?;

        let capacity_exceeded = model
            .std_config()
            .eeprom_capacity(self.config.size_unit)
            .filter(|capacity| len > *capacity)
            .map(|capacity| {
                log::warn!("Image of {len} bytes exceeds the EEPROM capacity of {capacity} bytes");
                GenerationError::CapacityExceeded {
                    required: len,
                    capacity,
                }
            });

        Ok(Generated {
            len: cursor.position(),
            capacity_exceeded,
        })
    }

    /// Allocates and writes the image. Fails on capacity overflow when
    /// [`CodecConfig::enforce_capacity`] is set.
    pub fn encode(&self, model: &CategoryModel) -> Result<Vec<u8>, SiiError> {
        let mut out = vec![0u8; self.encoded_len(model)];
        let generated = self.encode_into(model, &mut out)?;
        if let Some(err) = generated.capacity_exceeded {
            if self.config.enforce_capacity {
                return Err(err.into());
            }
        }
        Ok(out)
    }
}

/// Non-zero string indices a category references.
pub(crate) fn string_refs(category: &Category) -> impl Iterator<Item = u8> + '_ {
    let general = match &category.data {
        CategoryData::General(general) => general.string_refs().to_vec(),
        _ => Vec::new(),
    };
    let pdo = match &category.data {
        CategoryData::Pdo(pdo) => Some(pdo.string_refs()),
        _ => None,
    };
    general
        .into_iter()
        .chain(pdo.into_iter().flatten())
        .filter(|index| *index != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{FmmuCategory, FmmuUsage, General};
    use crate::header::{Preamble, StdConfig};

    fn model() -> CategoryModel {
        let mut model = CategoryModel::new(
            Preamble::default(),
            StdConfig {
                eeprom_size: 0x0400,
                ..Default::default()
            },
        );
        model.append_category(Category::new(CategoryData::Fmmu(FmmuCategory::from_usages([
            FmmuUsage::Outputs,
            FmmuUsage::Inputs,
            FmmuUsage::SyncManagerStatus,
        ]))));
        model
    }

    #[test]
    fn test_odd_payload_is_padded() {
        let generator = BinaryGenerator::default();
        let model = model();
        let image = generator.encode(&model).unwrap();
        assert_eq!(image.len(), 0x80 + 4 + 4 + 2);
        assert_eq!(&image[0x80..0x84], &[0x28, 0x00, 0x02, 0x00]);
        assert_eq!(&image[0x84..0x88], &[0x01, 0x02, 0x03, 0x00]);
        assert_eq!(&image[0x88..], &[0xFF, 0xFF]);
        // Fresh checksum over a zero preamble.
        assert_eq!(&image[0x0E..0x10], &[0x30, 0x00]);
    }

    #[test]
    fn test_dangling_string_index() {
        let mut model = model();
        model.append_category(Category::new(CategoryData::General(General {
            name_index: 2,
            ..Default::default()
        })));
        model.add_string("only one").unwrap();
        let err = BinaryGenerator::default().encode(&model).unwrap_err();
        assert_eq!(
            err,
            SiiError::Generation(GenerationError::DanglingStringIndex {
                category: 2,
                index: 2
            })
        );
    }

    #[test]
    fn test_capacity_soft_and_hard() {
        let mut model = model();
        model.std_config_mut().eeprom_size = 0x0040; // 128 bytes
        let config = CodecConfig::default().with_enforce_capacity(false);
        let generator = BinaryGenerator::new(config);
        let mut out = vec![0u8; 256];
        let generated = generator.encode_into(&model, &mut out).unwrap();
        assert_eq!(generated.len, 0x8A);
        assert_eq!(
            generated.capacity_exceeded,
            Some(GenerationError::CapacityExceeded {
                required: 0x8A,
                capacity: 128
            })
        );
        assert!(generator.encode(&model).is_ok());
        assert!(matches!(
            BinaryGenerator::default().encode(&model),
            Err(SiiError::Generation(GenerationError::CapacityExceeded { .. }))
        ));
    }

    #[test]
    fn test_short_output_buffer() {
        let model = model();
        let mut out = [0u8; 0x80];
        assert_eq!(
            BinaryGenerator::default().encode_into(&model, &mut out),
            Err(SiiError::BufferOverflow {
                offset: 0x80,
                needed: 10
            })
        );
    }

    #[test]
    fn test_trailer_is_reemitted() {
        let mut model = model();
        model.set_trailer(vec![0xFF; 6]);
        let image = BinaryGenerator::default().encode(&model).unwrap();
        assert_eq!(&image[image.len() - 8..], &[0xFF; 8]);
    }
}
