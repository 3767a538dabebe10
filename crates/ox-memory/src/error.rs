//! Memory access errors

use thiserror::Error;

use crate::MemoryId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Region {0} is not mapped")]
    Unmapped(MemoryId),

    #[error("Region {0} is already mapped")]
    AlreadyMapped(MemoryId),

    #[error("Access out of bounds in {id}: offset 0x{offset:x} + {len} > 0x{size:x}")]
    OutOfBounds {
        id: MemoryId,
        offset: usize,
        len: usize,
        size: usize,
    },
}
