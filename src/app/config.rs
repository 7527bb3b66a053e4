//! Configuration for the terminal probe

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::{ProbeOptions, CONTROLLING_TTY, DEFAULT_CAPACITY, DSR_REQUEST, DSR_TERMINATOR};

/// Probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Terminal device to probe
    pub device: PathBuf,
    /// Reply buffer capacity, end marker slot included
    pub capacity: usize,
    /// Byte that ends the reply
    pub terminator: u8,
    /// Send a newline after the status request
    pub append_newline: bool,
    /// Per-byte read timeout in milliseconds (unset = block)
    pub timeout_ms: Option<u16>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(CONTROLLING_TTY),
            capacity: DEFAULT_CAPACITY,
            terminator: DSR_TERMINATOR,
            append_newline: true,
            timeout_ms: None,
        }
    }
}

impl ProbeConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ProbeConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from default location or return default config
    pub fn load_or_default() -> Self {
        // ~/.config/tty-probe/config.json
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                    },
                }
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".to_string()));
        }
        if self.device.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("device path is empty".to_string()));
        }
        Ok(())
    }

    /// Bytes written to the terminal to request the report
    pub fn request(&self) -> Vec<u8> {
        let mut request = DSR_REQUEST.to_vec();
        if self.append_newline {
            request.push(b'\n');
        }
        request
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }

    pub fn probe_options(&self) -> ProbeOptions {
        ProbeOptions {
            capacity: self.capacity,
            terminator: self.terminator,
            request: self.request(),
            timeout: self.timeout(),
        }
    }
}

/// Default configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("tty-probe")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
