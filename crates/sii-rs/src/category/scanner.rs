// crates/sii-rs/src/category/scanner.rs

//! Walks the category area of an image and decodes each category.
//!
//! Problems inside one category never stop the scan: the category is kept as
//! an opaque payload and a [`Finding`] is recorded. Only a size that runs past
//! the end of the buffer ends the walk early.

use super::{Category, CategoryData, CategoryHeader, CategoryId};
use crate::cursor::Cursor;
use crate::finding::{Finding, FindingCode, Location, Severity};
use crate::log::{my_debug, my_trace, my_warn, CategoryContext};
use crate::types::{CATEGORY_END, SII_WORD};
use crate::SiiError;
use alloc::vec::Vec;

/// Result of a category scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Categories in the order they appear in the image.
    pub categories: Vec<Category>,
    pub findings: Vec<Finding>,
    /// Bytes following the end marker, verbatim.
    pub trailer: Vec<u8>,
    /// True if the 0xFFFF end marker was found.
    pub end_marker: bool,
}

/// Scans categories from `start` (normally 0x80) to the end marker.
///
/// Fails only if `start` lies beyond the buffer.
pub fn scan_categories(image: &[u8], start: usize) -> Result<ScanOutcome, SiiError> {
    let mut cursor = Cursor::new(image);
    cursor.seek(start)?;
    let mut outcome = ScanOutcome::default();

    loop {
        let offset = cursor.position();
        let index = outcome.categories.len();

        if cursor.remaining() == 0 {
            log::warn!("Image ends at {offset:#06x} without category end marker");
            outcome.findings.push(Finding::new(
                Severity::Warning,
                FindingCode::MissingEndMarker,
                Location::at_offset(offset),
            ));
            break;
        }

        let Some((word, size)) = read_header(&mut cursor, &mut outcome.findings) else {
            break;
        };
        if word == CATEGORY_END {
            outcome.end_marker = true;
            outcome.trailer = image[offset + SII_WORD..].to_vec();
            log::trace!(
                "End marker at {offset:#06x} after {index} categories, {} trailing byte(s)",
                outcome.trailer.len()
            );
            break;
        }
        let Some(size) = size else {
            break;
        };
        let Some(header) = CategoryHeader::from_word(word, size) else {
            break;
        };
        let ctx = CategoryContext {
            index,
            offset,
            kind: header.kind,
        };

        let payload_start = cursor.position();
        if cursor.remaining() < header.payload_len() {
            let needed = header.payload_len() - cursor.remaining();
            my_warn!(
                ctx,
                "Declared size of {} words runs {} byte(s) past the end of the image",
                size,
                needed
            );
            outcome.findings.push(Finding::new(
                Severity::Error,
                FindingCode::TruncatedInput { needed },
                Location::in_category(index).with_offset(offset),
            ));
            break;
        }
        my_trace!(ctx, "Decoding {} payload byte(s)", header.payload_len());
        let payload = cursor.read_bytes(header.payload_len())?;

        let data = match CategoryData::decode(&header, payload) {
            Ok(data) => data,
            Err(malformed) => {
                my_warn!(ctx, "Keeping category as raw data: {}", malformed.reason);
                let at = payload_start + malformed.offset;
                outcome.findings.push(Finding::new(
                    Severity::Error,
                    FindingCode::MalformedCategory(malformed),
                    Location::in_category(index).with_offset(at),
                ));
                CategoryData::Opaque {
                    kind: header.kind,
                    payload: payload.to_vec(),
                }
            }
        };

        if !header.kind.is_known() {
            my_debug!(ctx, "Unknown category type, {} byte(s) kept", payload.len());
            outcome.findings.push(Finding::new(
                Severity::Info,
                FindingCode::UnknownCategory {
                    type_code: header.kind.code(),
                },
                Location::in_category(index).with_offset(offset),
            ));
        }

        outcome.categories.push(Category {
            id: CategoryId::UNASSIGNED,
            vendor_specific: header.vendor_specific,
            declared_size: Some(size),
            data,
        });
    }

    Ok(outcome)
}

/// Reads the header word and, unless it is the end marker, the size word.
/// Returns `None` after recording a truncation finding.
fn read_header(
    cursor: &mut Cursor<&[u8]>,
    findings: &mut Vec<Finding>,
) -> Option<(u16, Option<u16>)> {
    let offset = cursor.position();
    let word = match cursor.read_u16() {
        Ok(word) => word,
        Err(_) => {
            findings.push(truncated(offset, SII_WORD - cursor.remaining()));
            return None;
        }
    };
    if word == CATEGORY_END {
        return Some((word, None));
    }
    match cursor.read_u16() {
        Ok(size) => Some((word, Some(size))),
        Err(_) => {
            findings.push(truncated(offset, SII_WORD - cursor.remaining()));
            None
        }
    }
}

fn truncated(offset: usize, needed: usize) -> Finding {
    log::warn!("Category header at {offset:#06x} is cut off, {needed} byte(s) missing");
    Finding::new(
        Severity::Error,
        FindingCode::TruncatedInput { needed },
        Location::at_offset(offset),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedReason;
    use crate::types::CategoryType;
    use alloc::vec;

    fn image(categories: &[u8]) -> Vec<u8> {
        let mut image = vec![0u8; 0x80];
        image.extend_from_slice(categories);
        image
    }

    #[test]
    fn test_scan_until_end_marker() {
        let data = image(&[
            0x28, 0x00, 0x01, 0x00, 0x01, 0x02, // FMMU, 1 word
            0xFF, 0xFF, 0xFF, 0xFF, 0xAA,
        ]);
        let outcome = scan_categories(&data, 0x80).unwrap();
        assert!(outcome.end_marker);
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.categories.len(), 1);
        assert_eq!(outcome.categories[0].kind(), CategoryType::Fmmu);
        assert_eq!(outcome.categories[0].declared_size, Some(1));
        assert_eq!(outcome.trailer, vec![0xFF, 0xFF, 0xAA]);
    }

    #[test]
    fn test_unknown_category_kept_opaque() {
        let data = image(&[0x00, 0x08, 0x01, 0x00, 0x12, 0x34, 0xFF, 0xFF]);
        let outcome = scan_categories(&data, 0x80).unwrap();
        assert_eq!(
            outcome.categories[0].data,
            CategoryData::Opaque {
                kind: CategoryType::Other(0x0800),
                payload: vec![0x12, 0x34],
            }
        );
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(outcome.findings[0].severity, Severity::Info);
    }

    #[test]
    fn test_oversized_category_stops_scan() {
        let data = image(&[0x28, 0x00, 0x10, 0x00, 0x01, 0x02]);
        let outcome = scan_categories(&data, 0x80).unwrap();
        assert!(outcome.categories.is_empty());
        assert!(!outcome.end_marker);
        assert_eq!(
            outcome.findings[0].code,
            FindingCode::TruncatedInput { needed: 30 }
        );
        assert_eq!(outcome.findings[0].severity, Severity::Error);
    }

    #[test]
    fn test_missing_end_marker() {
        let data = image(&[0x28, 0x00, 0x01, 0x00, 0x01, 0x02]);
        let outcome = scan_categories(&data, 0x80).unwrap();
        assert_eq!(outcome.categories.len(), 1);
        assert_eq!(outcome.findings[0].code, FindingCode::MissingEndMarker);
        assert_eq!(outcome.findings[0].severity, Severity::Warning);
    }

    #[test]
    fn test_stray_byte_is_truncation() {
        let data = image(&[0x28, 0x00, 0x01, 0x00, 0x01, 0x02, 0x1E]);
        let outcome = scan_categories(&data, 0x80).unwrap();
        assert_eq!(outcome.categories.len(), 1);
        assert_eq!(
            outcome.findings[0].code,
            FindingCode::TruncatedInput { needed: 1 }
        );
    }

    #[test]
    fn test_malformed_category_does_not_stop_scan() {
        let data = image(&[
            0x29, 0x00, 0x02, 0x00, 0, 0, 0, 0, // SyncManager with half a record
            0x28, 0x00, 0x01, 0x00, 0x01, 0x02, // FMMU
            0xFF, 0xFF,
        ]);
        let outcome = scan_categories(&data, 0x80).unwrap();
        assert_eq!(outcome.categories.len(), 2);
        assert!(matches!(
            outcome.categories[0].data,
            CategoryData::Opaque {
                kind: CategoryType::SyncManager,
                ..
            }
        ));
        assert!(matches!(outcome.categories[1].data, CategoryData::Fmmu(_)));
        assert_eq!(outcome.findings.len(), 1);
        assert_eq!(
            outcome.findings[0].malformed_reason(),
            Some(MalformedReason::PartialRecord {
                record_size: 8,
                remaining: 4
            })
        );
        assert_eq!(outcome.findings[0].location.offset, Some(0x84));
    }

    #[test]
    fn test_start_beyond_buffer() {
        assert!(scan_categories(&[0u8; 16], 0x80).is_err());
    }
}
