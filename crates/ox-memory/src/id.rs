//! Memory region identifiers

use std::fmt;

/// Raw id of the battery-backed save RAM region
pub const MEMORY_SAVE_RAM: u32 = 0;
/// Raw id of the real-time clock region
pub const MEMORY_RTC: u32 = 1;
/// Raw id of the main system RAM region
pub const MEMORY_SYSTEM_RAM: u32 = 2;
/// Raw id of the video RAM region
pub const MEMORY_VIDEO_RAM: u32 = 3;

/// Frontend-visible memory region identifier
///
/// The well-known ids form a small fixed enumeration; anything else is
/// carried through as [`MemoryId::Other`] so cores and frontends can agree
/// on private regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemoryId {
    /// Battery-backed save RAM, persisted by the frontend
    SaveRam,
    /// Real-time clock data
    Rtc,
    /// Main system RAM
    SystemRam,
    /// Video RAM
    VideoRam,
    /// Core-specific region
    Other(u32),
}

impl MemoryId {
    /// Decode a raw region id
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            MEMORY_SAVE_RAM => MemoryId::SaveRam,
            MEMORY_RTC => MemoryId::Rtc,
            MEMORY_SYSTEM_RAM => MemoryId::SystemRam,
            MEMORY_VIDEO_RAM => MemoryId::VideoRam,
            other => MemoryId::Other(other),
        }
    }

    /// Raw region id
    pub fn raw(&self) -> u32 {
        match self {
            MemoryId::SaveRam => MEMORY_SAVE_RAM,
            MemoryId::Rtc => MEMORY_RTC,
            MemoryId::SystemRam => MEMORY_SYSTEM_RAM,
            MemoryId::VideoRam => MEMORY_VIDEO_RAM,
            MemoryId::Other(raw) => *raw,
        }
    }

    /// Whether the frontend is expected to persist this region between sessions
    pub fn is_persistent(&self) -> bool {
        matches!(self, MemoryId::SaveRam | MemoryId::Rtc)
    }
}

impl From<u32> for MemoryId {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryId::SaveRam => write!(f, "save RAM"),
            MemoryId::Rtc => write!(f, "RTC"),
            MemoryId::SystemRam => write!(f, "system RAM"),
            MemoryId::VideoRam => write!(f, "video RAM"),
            MemoryId::Other(raw) => write!(f, "region #{}", raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_known_ids() {
        assert_eq!(MemoryId::from_raw(0), MemoryId::SaveRam);
        assert_eq!(MemoryId::from_raw(2), MemoryId::SystemRam);
        assert_eq!(MemoryId::SystemRam.raw(), MEMORY_SYSTEM_RAM);
    }

    #[test]
    fn test_other_id_preserved() {
        let id = MemoryId::from(0x101);
        assert_eq!(id, MemoryId::Other(0x101));
        assert_eq!(id.raw(), 0x101);
        assert!(!id.is_persistent());
    }
}
