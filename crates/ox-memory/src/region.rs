//! Region descriptors and flags

use bitflags::bitflags;

use crate::MemoryId;

bitflags! {
    /// Region attribute flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RegionFlags: u32 {
        /// Contents are part of the core's save state
        const SAVE_STATE = 0b0000_0001;
    }
}

impl RegionFlags {
    /// Default flags for a well-known region id
    pub fn for_id(id: MemoryId) -> Self {
        match id {
            MemoryId::SaveRam | MemoryId::Rtc | MemoryId::SystemRam => Self::SAVE_STATE,
            MemoryId::VideoRam | MemoryId::Other(_) => Self::empty(),
        }
    }
}

/// A single core-owned memory block
///
/// The backing storage is allocated once and never resized, so a view taken
/// between two frames always points at the same bytes.
#[derive(Debug, Clone)]
pub struct MemoryRegion {
    /// Region identifier
    pub id: MemoryId,
    /// Attribute flags
    pub flags: RegionFlags,
    /// Region name
    pub name: &'static str,
    data: Box<[u8]>,
}

impl MemoryRegion {
    /// Allocate a zero-filled region
    pub fn new(id: MemoryId, size: usize, flags: RegionFlags, name: &'static str) -> Self {
        Self {
            id,
            flags,
            name,
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Zero the contents in place
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Base address of the backing storage
    pub fn base_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }
}
