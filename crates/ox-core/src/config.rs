//! Configuration system for oxidized-retro

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{RetroError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
    pub paths: PathConfig,
    /// Values answered to core variable queries
    pub core_options: BTreeMap<String, String>,
    pub debug: DebugConfig,
}

/// General frontend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Fail a frame on contract violations instead of logging them
    pub strict_contract: bool,
    pub auto_load_save_ram: bool,
    /// Frames to run headless, 0 = unbounded
    pub frame_limit: u32,
}

/// Video settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub allow_frame_dupe: bool,
    pub overscan: bool,
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub enable: bool,
    /// Queue capacity in stereo frames
    pub queue_frames: usize,
}

/// Input settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Raw device id per port
    pub port_devices: Vec<u32>,
    pub max_ports: u32,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub system: PathBuf,
    pub saves: PathBuf,
    pub states: PathBuf,
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    pub log_to_file: bool,
    pub log_path: PathBuf,
    /// Log every callback at trace level
    pub trace_callbacks: bool,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            strict_contract: true,
            auto_load_save_ram: true,
            frame_limit: 0,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            allow_frame_dupe: true,
            overscan: false,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enable: true,
            queue_frames: 4096,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            port_devices: vec![ox_input::DEVICE_JOYPAD],
            max_ports: 2,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxidized-retro");

        Self {
            system: base.join("system"),
            saves: base.join("saves"),
            states: base.join("states"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            log_to_file: false,
            log_path: PathBuf::from("oxidized-retro.log"),
            trace_callbacks: false,
        }
    }
}

impl Config {
    /// Load configuration from file, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path, writing defaults there when it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| RetroError::Config(format!("{}: {}", path.display(), e)))
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| RetroError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("oxidized-retro")
            .join("config.toml")
    }

    pub fn core_option(&self, key: &str) -> Option<&str> {
        self.core_options.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.general.strict_contract);
        assert!(config.general.auto_load_save_ram);
        assert!(config.video.allow_frame_dupe);
        assert!(!config.video.overscan);
        assert_eq!(config.audio.queue_frames, 4096);
        assert_eq!(config.input.port_devices, vec![1]);
        assert_eq!(config.input.max_ports, 2);
        assert!(config.paths.saves.ends_with("oxidized-retro/saves"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config
            .core_options
            .insert("nullcore_pattern".to_string(), "checker".to_string());
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.audio.queue_frames, config.audio.queue_frames);
        assert_eq!(parsed.core_option("nullcore_pattern"), Some("checker"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: Config = toml::from_str("[video]\noverscan = true\n").unwrap();
        assert!(parsed.video.overscan);
        assert!(parsed.video.allow_frame_dupe);
        assert!(parsed.general.strict_contract);
    }

    #[test]
    fn test_load_from_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.debug.log_level, LogLevel::Info);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.general.frame_limit, 0);
    }

    #[test]
    fn test_load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "general = 5").unwrap();
        assert!(matches!(Config::load_from(&path), Err(RetroError::Config(_))));
    }
}
