//! Logging setup
//!
//! `RUST_LOG` takes precedence over the configured level.

use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::DebugConfig;
use crate::error::Result;

/// Build the filter for a debug configuration
pub fn filter(config: &DebugConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()))
}

/// Install the global subscriber
///
/// Returns `Ok(false)` if a subscriber was already installed.
pub fn init(config: &DebugConfig) -> Result<bool> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(config));

    let installed = if config.log_to_file {
        if let Some(parent) = config.log_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!("Logging initialized at {:?}", config.log_level);
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = DebugConfig {
            log_level: LogLevel::Warn,
            log_to_file: true,
            log_path: dir.path().join("logs").join("retro.log"),
            trace_callbacks: false,
        };

        let first = init(&config).unwrap();
        let second = init(&config).unwrap();
        assert!(!second);
        if first {
            assert!(config.log_path.exists());
        }
    }
}
