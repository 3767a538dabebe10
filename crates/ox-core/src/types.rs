//! Data exchanged across the frontend/core boundary

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Static description of a core
///
/// Immutable for the life of the core and queryable before `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    /// Descriptive name of the library, without version numbers
    pub library_name: String,
    /// Descriptive version of the core
    pub library_version: String,
    /// Pipe-separated list of loadable extensions, e.g. `"bin|rom|iso"`
    pub valid_extensions: String,
    /// When set, `load_game` receives a valid path and no data.
    /// When clear, it receives data and the path may be absent.
    pub need_fullpath: bool,
    /// When set, the frontend must not extract archives before loading
    pub block_extract: bool,
}

impl SystemInfo {
    /// Iterate over the accepted extensions (without leading dots)
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.valid_extensions
            .split('|')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
    }

    /// Case-insensitive extension check; an empty list accepts everything
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        let mut listed = self.extensions().peekable();
        if listed.peek().is_none() {
            return true;
        }
        listed.any(|candidate| candidate.eq_ignore_ascii_case(ext))
    }

    pub fn accepts_path(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.accepts_extension(ext),
            None => self.extensions().next().is_none(),
        }
    }
}

/// Content handed to `load_game`
///
/// `data` is borrowed for the duration of the load call only; a core that
/// needs the bytes afterwards must copy them.
#[derive(Debug, Clone, Default)]
pub struct GameInfo<'a> {
    /// Path to the content; the core may rewrite it during a successful load
    pub path: Option<PathBuf>,
    /// Content bytes
    pub data: Option<&'a [u8]>,
    /// Frontend-specific metadata
    pub meta: Option<String>,
}

impl<'a> GameInfo<'a> {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            data: None,
            meta: None,
        }
    }

    pub fn from_data(data: &'a [u8]) -> Self {
        Self {
            path: None,
            data: Some(data),
            meta: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// Size of the content data in bytes
    pub fn size(&self) -> usize {
        self.data.map(<[u8]>::len).unwrap_or(0)
    }
}

/// Video geometry
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GameGeometry {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    /// Display aspect ratio; `<= 0.0` means derive it from the base size
    pub aspect_ratio: f32,
}

impl GameGeometry {
    /// Aspect ratio to present with
    pub fn effective_aspect_ratio(&self) -> f32 {
        if self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else if self.base_height > 0 {
            self.base_width as f32 / self.base_height as f32
        } else {
            0.0
        }
    }
}

/// Frame and audio timing
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SystemTiming {
    /// Frames per second
    pub fps: f64,
    /// Audio sample rate in Hz
    pub sample_rate: f64,
}

impl SystemTiming {
    /// Audio frames produced per video frame
    pub fn samples_per_frame(&self) -> f64 {
        if self.fps > 0.0 {
            self.sample_rate / self.fps
        } else {
            0.0
        }
    }
}

/// Audio/video profile, valid only while a game is loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SystemAvInfo {
    pub geometry: GameGeometry,
    pub timing: SystemTiming,
}

/// Video standard of the loaded content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Region {
    #[default]
    Ntsc,
    Pal,
}

impl Region {
    pub fn raw(&self) -> u32 {
        match self {
            Region::Ntsc => 0,
            Region::Pal => 1,
        }
    }
}

/// Pixel layout of frames passed to video refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum PixelFormat {
    /// 0RGB1555, native endian
    #[default]
    Xrgb1555,
    /// XRGB8888, native endian
    Xrgb8888,
    /// RGB565, native endian
    Rgb565,
}

impl PixelFormat {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(PixelFormat::Xrgb1555),
            1 => Some(PixelFormat::Xrgb8888),
            2 => Some(PixelFormat::Rgb565),
            _ => None,
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Xrgb1555 | PixelFormat::Rgb565 => 2,
            PixelFormat::Xrgb8888 => 4,
        }
    }
}

/// Screen rotation, counter-clockwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rotation {
    #[default]
    None,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_raw(raw: u32) -> Self {
        match raw % 4 {
            1 => Rotation::Deg90,
            2 => Rotation::Deg180,
            3 => Rotation::Deg270,
            _ => Rotation::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(exts: &str) -> SystemInfo {
        SystemInfo {
            library_name: "Test".to_string(),
            library_version: "1.0".to_string(),
            valid_extensions: exts.to_string(),
            need_fullpath: false,
            block_extract: false,
        }
    }

    #[test]
    fn test_extensions() {
        let info = info("bin|rom|iso");
        assert_eq!(info.extensions().collect::<Vec<_>>(), vec!["bin", "rom", "iso"]);
        assert!(info.accepts_extension("ROM"));
        assert!(info.accepts_extension(".iso"));
        assert!(!info.accepts_extension("zip"));
        assert!(info.accepts_path(Path::new("dir/game.Bin")));
        assert!(!info.accepts_path(Path::new("dir/game")));
    }

    #[test]
    fn test_empty_extension_list_accepts_all() {
        let info = info("");
        assert!(info.accepts_extension("anything"));
        assert!(info.accepts_path(Path::new("noext")));
    }

    #[test]
    fn test_game_info_size() {
        let bytes = [1u8, 2, 3];
        assert_eq!(GameInfo::from_data(&bytes).size(), 3);
        assert_eq!(GameInfo::from_path("game.rom").size(), 0);
    }

    #[test]
    fn test_aspect_ratio_fallback() {
        let geometry = GameGeometry {
            base_width: 320,
            base_height: 240,
            max_width: 320,
            max_height: 240,
            aspect_ratio: 0.0,
        };
        assert!((geometry.effective_aspect_ratio() - 4.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(GameGeometry::default().effective_aspect_ratio(), 0.0);
    }

    #[test]
    fn test_pixel_format() {
        assert_eq!(PixelFormat::default().bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::from_raw(1), Some(PixelFormat::Xrgb8888));
        assert_eq!(PixelFormat::from_raw(9), None);
    }
}
