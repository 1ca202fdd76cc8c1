// crates/sii-rs/src/cursor.rs

//! Bounds-checked sequential access to a fixed-capacity byte buffer.
//!
//! Every codec in this crate reads and writes through a [`Cursor`]. All
//! multi-byte values use EtherCAT wire order (little-endian). A read past the
//! end fails with [`SiiError::TruncatedInput`], a write past the capacity with
//! [`SiiError::BufferOverflow`]; nothing is silently truncated.

use crate::SiiError;

/// A read/write position over a byte buffer.
///
/// Read operations are available for any `B: AsRef<[u8]>`; write operations
/// additionally require `B: AsMut<[u8]>`.
#[derive(Debug)]
pub struct Cursor<B> {
    buffer: B,
    position: usize,
}

impl<B: AsRef<[u8]>> Cursor<B> {
    pub fn new(buffer: B) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Total size of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().len()
    }

    /// Number of bytes between the current position and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.position
    }

    /// Moves to an absolute offset. Seeking to `capacity()` is allowed.
    pub fn seek(&mut self, position: usize) -> Result<(), SiiError> {
        if position > self.capacity() {
            return Err(SiiError::TruncatedInput {
                offset: self.position,
                needed: position - self.position,
            });
        }
        self.position = position;
        Ok(())
    }

    /// Consumes the cursor, returning the underlying buffer.
    pub fn into_inner(self) -> B {
        self.buffer
    }

    pub fn read_u8(&mut self) -> Result<u8, SiiError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SiiError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, SiiError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, SiiError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads `len` bytes, borrowing them from the buffer.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], SiiError> {
        let start = self.position;
        let end = self.checked_end(len).ok_or(SiiError::TruncatedInput {
            offset: start,
            needed: len,
        })?;
        self.position = end;
        Ok(&self.buffer.as_ref()[start..end])
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], SiiError> {
        let bytes = self.read_bytes(N)?;
        // Length is guaranteed by read_bytes.
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn checked_end(&self, len: usize) -> Option<usize> {
        self.position
            .checked_add(len)
            .filter(|end| *end <= self.capacity())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Cursor<B> {
    pub fn write_u8(&mut self, value: u8) -> Result<(), SiiError> {
        self.write_bytes(&[value])
    }

    pub fn write_u16(&mut self, value: u16) -> Result<(), SiiError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<(), SiiError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<(), SiiError> {
        self.write_bytes(&value.to_le_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), SiiError> {
        let start = self.position;
        let end = self
            .checked_end(bytes.len())
            .ok_or(SiiError::BufferOverflow {
                offset: start,
                needed: bytes.len(),
            })?;
        self.buffer.as_mut()[start..end].copy_from_slice(bytes);
        self.position = end;
        Ok(())
    }

    /// Writes `len` copies of `value`.
    pub fn fill(&mut self, value: u8, len: usize) -> Result<(), SiiError> {
        let start = self.position;
        let end = self.checked_end(len).ok_or(SiiError::BufferOverflow {
            offset: start,
            needed: len,
        })?;
        self.buffer.as_mut()[start..end].fill(value);
        self.position = end;
        Ok(())
    }
}
