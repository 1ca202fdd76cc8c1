// crates/sii-rs/src/codec.rs

//! Entry points tying the header codecs, the scanner, the validator and the
//! generator together.

use crate::category::scan_categories;
use crate::config::{ChecksumPolicy, CodecConfig, InputFormat};
use crate::cursor::Cursor;
use crate::finding::{has_errors, Finding, FindingCode, Location, Severity};
use crate::generator::{BinaryGenerator, Generated};
use crate::header::{Preamble, StdConfig, FIXED_HEADER_SIZE};
use crate::model::CategoryModel;
use crate::validator::Validator;
use crate::SiiError;
use alloc::vec::Vec;

/// A decoded model with every non-fatal finding of the scan and validation.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub model: CategoryModel,
    pub findings: Vec<Finding>,
}

impl Decoded {
    pub fn has_errors(&self) -> bool {
        has_errors(&self.findings)
    }
}

/// SII image codec carrying a [`CodecConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SiiCodec {
    config: CodecConfig,
}

impl SiiCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Decodes an image.
    ///
    /// Fails only if the fixed header is incomplete or, under
    /// [`ChecksumPolicy::Strict`], if the preamble checksum does not match.
    /// Everything else is reported in [`Decoded::findings`].
    pub fn decode(&self, bytes: &[u8]) -> Result<Decoded, SiiError> {
        let mut findings = Vec::new();
        if let Some(hint) = self.config.format_hint {
            let detected = InputFormat::sniff(bytes);
            if hint != detected {
                log::warn!("Input was announced as {hint} but looks like {detected}");
                findings.push(Finding::new(
                    Severity::Warning,
                    FindingCode::FormatHintMismatch { hint, detected },
                    Location::at_offset(0),
                ));
            }
        }

        if bytes.len() < FIXED_HEADER_SIZE {
            return Err(SiiError::TruncatedInput {
                offset: bytes.len(),
                needed: FIXED_HEADER_SIZE - bytes.len(),
            });
        }

        let mut cursor = Cursor::new(bytes);
        let preamble = match Preamble::decode(&mut cursor) {
            Ok(preamble) => preamble,
            Err(SiiError::ChecksumMismatch { preamble, .. })
                if self.config.checksum == ChecksumPolicy::Lenient =>
            {
                // The validator reports the mismatch from the stored value.
                preamble
            }
            Err(err) => return Err(err),
        };
        let std_config = StdConfig::decode(&mut cursor)?;

        let scan = scan_categories(bytes, FIXED_HEADER_SIZE)?;
        log::debug!(
            "Decoded {} categories, end marker {}, {} trailing byte(s)",
            scan.categories.len(),
            if scan.end_marker { "found" } else { "missing" },
            scan.trailer.len()
        );
        let model = CategoryModel::from_parts(preamble, std_config, scan.categories, scan.trailer);

        findings.extend(scan.findings);
        findings.extend(self.validate(&model));
        Ok(Decoded { model, findings })
    }

    /// Encodes a model into a freshly allocated image.
    pub fn encode(&self, model: &CategoryModel) -> Result<Vec<u8>, SiiError> {
        BinaryGenerator::new(self.config).encode(model)
    }

    /// Encodes a model into a caller-owned buffer.
    pub fn encode_into(
        &self,
        model: &CategoryModel,
        out: &mut [u8],
    ) -> Result<Generated, SiiError> {
        BinaryGenerator::new(self.config).encode_into(model, out)
    }

    /// Exact size of the image `encode` produces.
    pub fn encoded_len(&self, model: &CategoryModel) -> usize {
        BinaryGenerator::new(self.config).encoded_len(model)
    }

    pub fn validate(&self, model: &CategoryModel) -> Vec<Finding> {
        Validator::new(self.config.size_unit).validate(model)
    }
}

/// Decodes an image with the default configuration.
pub fn decode(bytes: &[u8]) -> Result<Decoded, SiiError> {
    SiiCodec::default().decode(bytes)
}

/// Encodes a model with the default configuration.
pub fn encode(model: &CategoryModel) -> Result<Vec<u8>, SiiError> {
    SiiCodec::default().encode(model)
}
