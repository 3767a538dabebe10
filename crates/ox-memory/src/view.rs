//! Borrowed frontend views over core memory

use crate::error::MemoryError;
use crate::MemoryId;

/// A live, zero-copy window into a core-owned region
///
/// The view borrows the core (through its host) mutably, so it can only
/// exist between lifecycle calls and never across a frame step. Writes are
/// visible to the core on its next frame.
#[derive(Debug)]
pub struct MemoryView<'a> {
    id: MemoryId,
    data: &'a mut [u8],
}

impl<'a> MemoryView<'a> {
    pub fn new(id: MemoryId, data: &'a mut [u8]) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> MemoryId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        self.data
    }

    fn check(&self, offset: usize, len: usize) -> Result<(), MemoryError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(MemoryError::OutOfBounds {
                id: self.id,
                offset,
                len,
                size: self.data.len(),
            }),
        }
    }

    /// Copy bytes out of the region
    pub fn read(&self, offset: usize, out: &mut [u8]) -> Result<(), MemoryError> {
        self.check(offset, out.len())?;
        out.copy_from_slice(&self.data[offset..offset + out.len()]);
        Ok(())
    }

    /// Copy bytes into the region
    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        self.check(offset, bytes.len())?;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, MemoryError> {
        self.check(offset, 1)?;
        Ok(self.data[offset])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<(), MemoryError> {
        self.check(offset, 1)?;
        self.data[offset] = value;
        Ok(())
    }
}
