//! Region map owned by a core

use crate::error::MemoryError;
use crate::region::{MemoryRegion, RegionFlags};
use crate::MemoryId;

/// The set of regions a core exposes while a game is loaded
///
/// Regions are mapped once during load and dropped together on unload.
/// Mapping never reallocates an existing region, so borrowed spans stay at
/// the same address for as long as the region lives.
#[derive(Debug, Default, Clone)]
pub struct MemoryMap {
    regions: Vec<MemoryRegion>,
}

impl MemoryMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a zero-filled region with the default flags for its id
    pub fn map(&mut self, id: MemoryId, size: usize, name: &'static str) -> Result<(), MemoryError> {
        self.map_with_flags(id, size, RegionFlags::for_id(id), name)
    }

    /// Map a zero-filled region with explicit flags
    pub fn map_with_flags(
        &mut self,
        id: MemoryId,
        size: usize,
        flags: RegionFlags,
        name: &'static str,
    ) -> Result<(), MemoryError> {
        if self.region(id).is_some() {
            return Err(MemoryError::AlreadyMapped(id));
        }

        tracing::debug!("Mapping {} ({}): {} bytes, {:?}", name, id, size, flags);
        self.regions.push(MemoryRegion::new(id, size, flags, name));
        Ok(())
    }

    /// Drop every region
    pub fn unmap_all(&mut self) {
        self.regions.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region(&self, id: MemoryId) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: MemoryId) -> Option<&mut MemoryRegion> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    /// Size of a region in bytes, 0 when unmapped
    pub fn size(&self, id: MemoryId) -> usize {
        self.region(id).map(MemoryRegion::size).unwrap_or(0)
    }

    /// Direct span over a region
    pub fn data(&self, id: MemoryId) -> Option<&[u8]> {
        self.region(id).map(MemoryRegion::as_slice)
    }

    /// Direct mutable span over a region
    pub fn data_mut(&mut self, id: MemoryId) -> Option<&mut [u8]> {
        self.region_mut(id).map(MemoryRegion::as_mut_slice)
    }

    /// Iterate over mapped regions in mapping order
    pub fn iter(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions.iter()
    }

    /// Regions whose contents belong in a save state
    pub fn state_regions(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions
            .iter()
            .filter(|r| r.flags.contains(RegionFlags::SAVE_STATE))
    }

    /// Combined size of all save-state regions
    pub fn state_size(&self) -> usize {
        self.state_regions().map(MemoryRegion::size).sum()
    }

    fn span(&self, id: MemoryId, offset: usize, len: usize) -> Result<&[u8], MemoryError> {
        let data = self.data(id).ok_or(MemoryError::Unmapped(id))?;
        let end = offset.checked_add(len).filter(|&end| end <= data.len()).ok_or(
            MemoryError::OutOfBounds {
                id,
                offset,
                len,
                size: data.len(),
            },
        )?;
        Ok(&data[offset..end])
    }

    fn span_mut(&mut self, id: MemoryId, offset: usize, len: usize) -> Result<&mut [u8], MemoryError> {
        let data = self.data_mut(id).ok_or(MemoryError::Unmapped(id))?;
        let size = data.len();
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= size)
            .ok_or(MemoryError::OutOfBounds { id, offset, len, size })?;
        Ok(&mut data[offset..end])
    }

    pub fn read_bytes(&self, id: MemoryId, offset: usize, out: &mut [u8]) -> Result<(), MemoryError> {
        out.copy_from_slice(self.span(id, offset, out.len())?);
        Ok(())
    }

    pub fn write_bytes(&mut self, id: MemoryId, offset: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        self.span_mut(id, offset, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn read_u8(&self, id: MemoryId, offset: usize) -> Result<u8, MemoryError> {
        Ok(self.span(id, offset, 1)?[0])
    }

    pub fn write_u8(&mut self, id: MemoryId, offset: usize, value: u8) -> Result<(), MemoryError> {
        self.span_mut(id, offset, 1)?[0] = value;
        Ok(())
    }

    /// Read a little-endian u16
    pub fn read_u16(&self, id: MemoryId, offset: usize) -> Result<u16, MemoryError> {
        let mut buf = [0u8; 2];
        self.read_bytes(id, offset, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Write a little-endian u16
    pub fn write_u16(&mut self, id: MemoryId, offset: usize, value: u16) -> Result<(), MemoryError> {
        self.write_bytes(id, offset, &value.to_le_bytes())
    }

    /// Read a little-endian u32
    pub fn read_u32(&self, id: MemoryId, offset: usize) -> Result<u32, MemoryError> {
        let mut buf = [0u8; 4];
        self.read_bytes(id, offset, &mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Write a little-endian u32
    pub fn write_u32(&mut self, id: MemoryId, offset: usize, value: u32) -> Result<(), MemoryError> {
        self.write_bytes(id, offset, &value.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_map() -> MemoryMap {
        let mut map = MemoryMap::new();
        map.map(MemoryId::SystemRam, 0x2000, "System RAM").unwrap();
        map.map(MemoryId::SaveRam, 0x800, "Save RAM").unwrap();
        map.map(MemoryId::VideoRam, 0x100, "Video RAM").unwrap();
        map
    }

    #[test]
    fn test_size_of_unmapped_is_zero() {
        let map = test_map();
        assert_eq!(map.size(MemoryId::SystemRam), 0x2000);
        assert_eq!(map.size(MemoryId::Rtc), 0);
        assert!(map.data(MemoryId::Rtc).is_none());
    }

    #[test]
    fn test_double_map_rejected() {
        let mut map = test_map();
        assert_eq!(
            map.map(MemoryId::SystemRam, 16, "again"),
            Err(MemoryError::AlreadyMapped(MemoryId::SystemRam))
        );
    }

    #[test]
    fn test_little_endian_access() {
        let mut map = test_map();
        map.write_u32(MemoryId::SystemRam, 8, 0xDEADBEEF).unwrap();
        assert_eq!(map.read_u8(MemoryId::SystemRam, 8).unwrap(), 0xEF);
        assert_eq!(map.read_u16(MemoryId::SystemRam, 10).unwrap(), 0xDEAD);
        assert_eq!(map.read_u32(MemoryId::SystemRam, 8).unwrap(), 0xDEADBEEF);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut map = test_map();
        let err = map.write_u32(MemoryId::SaveRam, 0x7FE, 1).unwrap_err();
        assert!(matches!(err, MemoryError::OutOfBounds { size: 0x800, .. }));
        assert!(map.read_u8(MemoryId::Rtc, 0).is_err());
    }

    #[test]
    fn test_state_regions_skip_video() {
        let map = test_map();
        let ids: Vec<_> = map.state_regions().map(|r| r.id).collect();
        assert_eq!(ids, vec![MemoryId::SystemRam, MemoryId::SaveRam]);
        assert_eq!(map.state_size(), 0x2000 + 0x800);
    }
}
