//! Owned byte block for exchanging fixed-layout structures with the OS.
//!
//! The buffer tracks two sizes: `capacity()` is what was allocated and handed
//! to the OS, `len()` is how much of it holds valid data (what the OS reported
//! writing). All typed access is checked against `len()`.

use byteorder::{ByteOrder, LittleEndian};

use crate::errors::{InteropError, Result};

/// A native structure with a fixed little-endian byte layout.
///
/// `decode` and `encode` receive exactly `SIZE` bytes.
pub trait FixedLayout: Sized {
    const SIZE: usize;

    fn decode(bytes: &[u8]) -> Self;

    fn encode(&self, out: &mut [u8]);
}

#[derive(Debug, Default)]
pub struct SafeBuffer {
    data: Vec<u8>,
    len: usize,
    released: bool,
}

impl SafeBuffer {
    pub fn zeroed(size: usize) -> Self {
        Self {
            data: vec![0; size],
            len: size,
            released: false,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            len: bytes.len(),
            released: false,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.len]
    }

    /// Shrink the valid length; never grows it.
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Free the block now. Later calls are no-ops.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.data = Vec::new();
        self.len = 0;
        self.released = true;
    }

    pub fn is_invalid(&self) -> bool {
        self.released
    }

    fn range(&self, offset: usize, size: usize) -> Result<std::ops::Range<usize>> {
        match offset.checked_add(size) {
            Some(end) if end <= self.len => Ok(offset..end),
            _ => Err(InteropError::InvalidBufferAccess {
                offset,
                size,
                len: self.len,
            }),
        }
    }

    pub fn read_bytes(&self, offset: usize, size: usize) -> Result<&[u8]> {
        let r = self.range(offset, size)?;
        Ok(&self.data[r])
    }

    pub fn read_struct<T: FixedLayout>(&self, offset: usize) -> Result<T> {
        let r = self.range(offset, T::SIZE)?;
        Ok(T::decode(&self.data[r]))
    }

    pub fn write_struct<T: FixedLayout>(&mut self, offset: usize, value: &T) -> Result<()> {
        let r = self.range(offset, T::SIZE)?;
        value.encode(&mut self.data[r]);
        Ok(())
    }

    /// `count` consecutive structures starting at `offset`.
    pub fn read_array<T: FixedLayout>(&self, offset: usize, count: usize) -> Result<Vec<T>> {
        let total = T::SIZE.checked_mul(count).ok_or(InteropError::InvalidBufferAccess {
            offset,
            size: usize::MAX,
            len: self.len,
        })?;
        let r = self.range(offset, total)?;
        Ok(self.data[r]
            .chunks_exact(T::SIZE)
            .map(T::decode)
            .collect())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8> {
        Ok(self.read_bytes(offset, 1)?[0])
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(offset, 2)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(offset, 4)?))
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(offset, 8)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_never_grows() {
        let mut b = SafeBuffer::zeroed(16);
        b.truncate(32);
        assert_eq!(b.len(), 16);
        b.truncate(4);
        assert_eq!(b.len(), 4);
        assert_eq!(b.capacity(), 16);
    }

    #[test]
    fn reads_are_bounded_by_valid_length() {
        let mut b = SafeBuffer::from_bytes(&[1, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(b.read_u32(4).unwrap(), 2);
        b.truncate(6);
        assert!(b.read_u32(4).is_err());
        assert_eq!(b.read_u16(4).unwrap(), 2);
    }

    #[test]
    fn offset_overflow_is_an_access_error() {
        let b = SafeBuffer::zeroed(8);
        assert!(matches!(
            b.read_bytes(usize::MAX, 2),
            Err(InteropError::InvalidBufferAccess { .. })
        ));
    }
}
