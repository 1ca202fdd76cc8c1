// crates/sii-rs/src/validator.rs

//! Semantic checks over a decoded or hand-built [`CategoryModel`].

use crate::category::CategoryData;
use crate::finding::{Finding, FindingCode, Location, ReservedRegion, Severity};
use crate::generator::{string_refs, BinaryGenerator};
use crate::header::FIXED_HEADER_SIZE;
use crate::model::CategoryModel;
use crate::types::{EepromSizeUnit, CATEGORY_HEADER_SIZE, SII_WORD};
use alloc::vec::Vec;

/// Offset of the mailbox protocol word within the image.
const MAILBOX_PROTOCOL_OFFSET: usize = 0x38;
/// Offset of the EEPROM size word within the image.
const EEPROM_SIZE_OFFSET: usize = 0x7C;

/// Runs every check and collects the findings. Never mutates the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    size_unit: EepromSizeUnit,
}

impl Validator {
    pub fn new(size_unit: EepromSizeUnit) -> Self {
        Self { size_unit }
    }

    pub fn validate(&self, model: &CategoryModel) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.check_preamble(model, &mut findings);
        self.check_std_config(model, &mut findings);
        self.check_categories(model, &mut findings);
        findings
    }

    fn check_preamble(&self, model: &CategoryModel, findings: &mut Vec<Finding>) {
        let preamble = model.preamble();
        if let Some(stored) = preamble.stored_checksum {
            let computed = preamble.computed_checksum();
            if stored != u16::from(computed) {
                findings.push(Finding::new(
                    Severity::Error,
                    FindingCode::ChecksumMismatch { stored, computed },
                    Location::at_offset(0x0E),
                ));
            }
        }
        if preamble.reserved.iter().any(|b| *b != 0) {
            findings.push(reserved(ReservedRegion::Preamble, Location::at_offset(0x0A)));
        }
    }

    fn check_std_config(&self, model: &CategoryModel, findings: &mut Vec<Finding>) {
        let config = model.std_config();
        if config.reserved_nonzero() {
            findings.push(reserved(ReservedRegion::StdConfig, Location::default()));
        }
        if config.mailbox_protocols.reserved != 0 {
            findings.push(reserved(
                ReservedRegion::MailboxProtocols,
                Location::at_offset(MAILBOX_PROTOCOL_OFFSET),
            ));
        }

        let Some(capacity) = config.eeprom_capacity(self.size_unit) else {
            return;
        };
        let required = BinaryGenerator::default().encoded_len(model);
        if required > capacity {
            findings.push(Finding::new(
                Severity::Error,
                FindingCode::ImageExceedsCapacity { required, capacity },
                Location::at_offset(EEPROM_SIZE_OFFSET),
            ));
        }
        // Bootstrap receive mailbox at 0x28, each region takes 4 bytes.
        for (slot, (mailbox, region)) in config.mailboxes().into_iter().enumerate() {
            let end = region.end();
            if end as usize > capacity {
                findings.push(Finding::new(
                    Severity::Error,
                    FindingCode::MailboxOutOfBounds {
                        mailbox,
                        end,
                        capacity,
                    },
                    Location::at_offset(0x28 + slot * 4),
                ));
            }
        }
    }

    fn check_categories(&self, model: &CategoryModel, findings: &mut Vec<Finding>) {
        let mut offset = FIXED_HEADER_SIZE;
        for (index, category) in model.categories().iter().enumerate() {
            let location = Location::in_category(index).with_offset(offset);

            match &category.data {
                CategoryData::General(general) if general.reserved_nonzero() => {
                    findings.push(reserved(ReservedRegion::General, location));
                }
                CategoryData::DistributedClock(dc) if dc.reserved_nonzero() => {
                    findings.push(reserved(ReservedRegion::DistributedClock, location));
                }
                CategoryData::Pdo(pdos) => {
                    for pdo in pdos.pdos.iter().filter(|p| p.entries.len() > usize::from(u8::MAX)) {
                        findings.push(Finding::new(
                            Severity::Error,
                            FindingCode::PdoEntryCount {
                                pdo_index: pdo.index,
                                count: pdo.entries.len(),
                            },
                            location,
                        ));
                    }
                }
                _ => {}
            }

            for index in string_refs(category).filter(|i| model.string_at(*i).is_none()) {
                findings.push(Finding::new(
                    Severity::Error,
                    FindingCode::DanglingStringIndex { index },
                    location,
                ));
            }

            let actual = category.size_words();
            if let Some(declared) = category.declared_size {
                if usize::from(declared) != actual {
                    findings.push(Finding::new(
                        Severity::Warning,
                        FindingCode::StaleCategorySize { declared, actual },
                        location,
                    ));
                }
            }

            offset += CATEGORY_HEADER_SIZE + actual * SII_WORD;
        }
    }
}

fn reserved(region: ReservedRegion, location: Location) -> Finding {
    Finding::new(Severity::Warning, FindingCode::ReservedNonZero { region }, location)
}

/// Validates with the default [`EepromSizeUnit`].
pub fn validate(model: &CategoryModel) -> Vec<Finding> {
    Validator::default().validate(model)
}
