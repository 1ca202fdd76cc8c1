// crates/sii-rs/src/category/strings.rs

use super::{CategoryCodec, CategoryHeader};
use crate::cursor::Cursor;
use crate::error::{GenerationError, MalformedCategory, MalformedReason};
use crate::SiiError;
use alloc::string::String;
use alloc::vec::Vec;

/// The string repository referenced by other categories (type 10).
///
/// Indices are 1-based; index 0 means "no string". Text is stored as
/// ISO-8859-1, so every byte maps to exactly one `char`.
/// (Reference: ETG.1000.6, Table 20)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringsCategory {
    pub strings: Vec<String>,
}

impl StringsCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a 1-based string index.
    pub fn get(&self, index: u8) -> Option<&str> {
        let slot = usize::from(index).checked_sub(1)?;
        self.strings.get(slot).map(String::as_str)
    }

    /// 1-based index of the first string equal to `text`.
    pub fn position(&self, text: &str) -> Option<u8> {
        self.strings
            .iter()
            .position(|s| s == text)
            .and_then(|i| u8::try_from(i + 1).ok())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl CategoryCodec for StringsCategory {
    fn decode(header: &CategoryHeader, payload: &[u8]) -> Result<Self, MalformedCategory> {
        let mut cursor = Cursor::new(payload);
        let count = cursor.read_u8().map_err(|_| {
            header.malformed(
                0,
                MalformedReason::TooShort {
                    minimum: 1,
                    actual: 0,
                },
            )
        })?;

        let mut strings = Vec::with_capacity(usize::from(count));
        for index in 1..=usize::from(count) {
            let offset = cursor.position();
            let overrun = || header.malformed(offset, MalformedReason::StringOverrun { index });
            let len = cursor.read_u8().map_err(|_| overrun())?;
            let text = cursor.read_bytes(usize::from(len)).map_err(|_| overrun())?;
            strings.push(text.iter().copied().map(char::from).collect());
        }

        // One zero pad byte may round the payload up to a whole word.
        let rest = &payload[cursor.position()..];
        if rest.len() > 1 || rest.iter().any(|b| *b != 0) {
            return Err(header.malformed(
                cursor.position(),
                MalformedReason::TrailingBytes {
                    count: cursor.remaining(),
                },
            ));
        }
        Ok(Self { strings })
    }

    fn encode<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut Cursor<B>) -> Result<(), SiiError> {
        let count = u8::try_from(self.strings.len()).map_err(|_| GenerationError::TooManyRecords {
            category: 0,
            count: self.strings.len(),
        })?;
        cursor.write_u8(count)?;
        for (i, text) in self.strings.iter().enumerate() {
            let bytes = latin1_bytes(text)
                .ok_or(GenerationError::StringNotEncodable { index: i + 1 })?;
            // latin1_bytes guarantees the length fits.
            cursor.write_u8(bytes.len() as u8)?;
            cursor.write_bytes(&bytes)?;
        }
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        1 + self
            .strings
            .iter()
            .map(|s| 1 + s.chars().count())
            .sum::<usize>()
    }

    fn check(&self, category: usize) -> Result<(), GenerationError> {
        if self.strings.len() > usize::from(u8::MAX) {
            return Err(GenerationError::TooManyRecords {
                category,
                count: self.strings.len(),
            });
        }
        match self.strings.iter().position(|s| latin1_bytes(s).is_none()) {
            Some(i) => Err(GenerationError::StringNotEncodable { index: i + 1 }),
            None => Ok(()),
        }
    }
}

/// Converts text to ISO-8859-1, or `None` if a char is above U+00FF or
/// the result exceeds 255 bytes.
fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    (bytes.len() <= usize::from(u8::MAX)).then_some(bytes)
}
