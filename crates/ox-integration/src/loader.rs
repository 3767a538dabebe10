//! Content loading
//!
//! Turns a path into owned content shaped the way the core asked for it.

use std::path::{Path, PathBuf};

use ox_core::{GameInfo, LoadError, SystemInfo};
use tracing::{debug, info, warn};

const ARCHIVE_EXTENSIONS: [&str; 3] = ["zip", "7z", "rar"];

/// Content owned by the frontend for the lifetime of a loaded game
#[derive(Debug, Clone)]
pub struct LoadedContent {
    /// Path as given, or as rewritten by the core
    pub path: PathBuf,
    /// File bytes; `None` when the core reads the file itself
    pub data: Option<Vec<u8>>,
    pub meta: Option<String>,
}

impl LoadedContent {
    /// Borrowed request handed to `load_game`
    pub fn game_info(&self) -> GameInfo<'_> {
        GameInfo {
            path: Some(self.path.clone()),
            data: self.data.as_deref(),
            meta: self.meta.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// File stem, used to name save files
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "content".to_string())
    }
}

/// Loader configured from a core's [`SystemInfo`]
#[derive(Debug, Clone)]
pub struct ContentLoader {
    info: SystemInfo,
}

impl ContentLoader {
    pub fn new(info: SystemInfo) -> Self {
        Self { info }
    }

    /// Load content from a file path
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedContent, LoadError> {
        let path = path.as_ref();
        info!("Loading content: {}", path.display());

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let is_archive = ARCHIVE_EXTENSIONS.contains(&ext.as_str());
        if !self.info.accepts_path(path) {
            if is_archive {
                warn!("Archive extraction is not supported: {}", path.display());
            }
            return Err(LoadError::UnsupportedExtension(ext));
        }
        if is_archive && !self.info.block_extract {
            warn!("Passing archive {} to the core unextracted", path.display());
        }

        if self.info.need_fullpath {
            let canonical = std::fs::canonicalize(path)
                .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
            debug!("Core reads content itself from {}", canonical.display());
            return Ok(LoadedContent {
                path: canonical,
                data: None,
                meta: None,
            });
        }

        let data = std::fs::read(path).map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
        debug!("Read {} bytes", data.len());
        Ok(LoadedContent {
            path: path.to_path_buf(),
            data: Some(data),
            meta: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(need_fullpath: bool) -> SystemInfo {
        SystemInfo {
            library_name: "Test".to_string(),
            library_version: "1".to_string(),
            valid_extensions: "bin|rom".to_string(),
            need_fullpath,
            block_extract: false,
        }
    }

    #[test]
    fn test_reads_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.bin");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let content = ContentLoader::new(info(false)).load(&path).unwrap();
        assert_eq!(content.data.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(content.stem(), "game");
        assert_eq!(content.game_info().size(), 3);
    }

    #[test]
    fn test_full_path_skips_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.ROM");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let content = ContentLoader::new(info(true)).load(&path).unwrap();
        assert!(content.data.is_none());
        assert!(content.path.is_absolute());
        assert_eq!(content.size(), 0);
    }

    #[test]
    fn test_rejects_unknown_extension() {
        let loader = ContentLoader::new(info(false));
        assert_eq!(
            loader.load("game.iso").unwrap_err(),
            LoadError::UnsupportedExtension("iso".to_string())
        );
    }

    #[test]
    fn test_archive_rejected_unless_listed() {
        let loader = ContentLoader::new(info(false));
        assert!(matches!(loader.load("game.zip"), Err(LoadError::UnsupportedExtension(_))));
    }

    #[test]
    fn test_missing_file() {
        let loader = ContentLoader::new(info(false));
        assert!(matches!(loader.load("/nonexistent/game.bin"), Err(LoadError::Io(_))));
    }
}
