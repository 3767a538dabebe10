//! Save RAM persistence

use std::path::{Path, PathBuf};

use ox_core::Result;
use ox_memory::MemoryView;
use tracing::{debug, info, warn};

/// Stores battery-backed RAM as `<dir>/<stem>.srm`
#[derive(Debug, Clone)]
pub struct SaveRamStore {
    dir: PathBuf,
}

impl SaveRamStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.srm", stem))
    }

    /// Copy a stored file into the core's save RAM
    ///
    /// Returns `false` when nothing was stored yet.
    pub fn restore(&self, stem: &str, view: &mut MemoryView<'_>) -> Result<bool> {
        let path = self.path_for(stem);
        if !path.exists() {
            debug!("No save RAM at {}", path.display());
            return Ok(false);
        }

        let bytes = std::fs::read(&path)?;
        if bytes.len() != view.len() {
            warn!(
                "Save RAM size mismatch: file {} bytes, core {} bytes",
                bytes.len(),
                view.len()
            );
        }
        let n = bytes.len().min(view.len());
        view.write(0, &bytes[..n])?;
        info!("Restored {} bytes of save RAM from {}", n, path.display());
        Ok(true)
    }

    /// Write the core's save RAM out
    pub fn flush(&self, stem: &str, view: &MemoryView<'_>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(stem);
        std::fs::write(&path, view.as_slice())?;
        info!("Saved {} bytes of save RAM to {}", view.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ox_memory::MemoryId;

    #[test]
    fn test_flush_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveRamStore::new(dir.path().join("saves"));

        let mut ram = vec![0u8; 64];
        ram[3] = 0x42;
        let view = MemoryView::new(MemoryId::SaveRam, &mut ram);
        let path = store.flush("game", &view).unwrap();
        assert!(path.ends_with("game.srm"));

        let mut fresh = vec![0u8; 64];
        let mut view = MemoryView::new(MemoryId::SaveRam, &mut fresh);
        assert!(store.restore("game", &mut view).unwrap());
        assert_eq!(fresh[3], 0x42);
    }

    #[test]
    fn test_restore_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveRamStore::new(dir.path());
        let mut ram = vec![7u8; 8];
        let mut view = MemoryView::new(MemoryId::SaveRam, &mut ram);
        assert!(!store.restore("nothing", &mut view).unwrap());
        assert_eq!(ram, vec![7u8; 8]);
    }

    #[test]
    fn test_restore_truncates_larger_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SaveRamStore::new(dir.path());
        std::fs::write(store.path_for("big"), [1u8; 16]).unwrap();

        let mut ram = vec![0u8; 4];
        let mut view = MemoryView::new(MemoryId::SaveRam, &mut ram);
        assert!(store.restore("big", &mut view).unwrap());
        assert_eq!(ram, vec![1u8; 4]);
    }
}
