//! Toolkit configuration.
//!
//! All sections are optional in TOML; anything missing falls back to the
//! defaults below.
//!
//! ```toml
//! [input]
//! buffer_size = 32
//! escape_timeout_ms = 25
//!
//! [terminal]
//! mouse = true
//! alternate_screen = true
//!
//! [workers]
//! poll_interval_secs = 3
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_BUFFER_SIZE: usize = 32;
pub const MIN_BUFFER_SIZE: usize = 6;
pub const DEFAULT_ESCAPE_TIMEOUT_MS: u64 = 25;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 3;

// =============================================================================
// Config Structs
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub terminal: TerminalConfig,
    pub workers: WorkerConfig,
}

/// Input decoder settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Upper bound on a buffered, still-undecoded byte run. Escape sequences
    /// longer than this are dropped.
    pub buffer_size: usize,
    /// How long a lone or partial ESC waits for the rest of its sequence.
    pub escape_timeout_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            escape_timeout_ms: DEFAULT_ESCAPE_TIMEOUT_MS,
        }
    }
}

impl InputConfig {
    /// Buffer bound, never smaller than a complete mouse report.
    #[inline]
    pub fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(MIN_BUFFER_SIZE)
    }

    #[inline]
    pub fn escape_timeout(&self) -> Duration {
        Duration::from_millis(self.escape_timeout_ms)
    }
}

/// Terminal mode settings applied by [`crate::pipeline::Terminal::enter`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Enable X10 mouse reporting (`ESC [ M` + 3 bytes).
    pub mouse: bool,
    /// Switch to the alternate screen buffer while running.
    pub alternate_screen: bool,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            mouse: true,
            alternate_screen: true,
        }
    }
}

/// Background poller settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub poll_interval_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl WorkerConfig {
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml_str(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.input.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.input.escape_timeout(), Duration::from_millis(25));
        assert!(config.terminal.mouse);
        assert_eq!(config.workers.poll_interval(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str("[input]\nbuffer_size = 64\n").unwrap();
        assert_eq!(config.input.buffer_size, 64);
        assert_eq!(config.input.escape_timeout_ms, DEFAULT_ESCAPE_TIMEOUT_MS);
        assert_eq!(config.terminal, TerminalConfig::default());
    }

    #[test]
    fn test_buffer_size_floor() {
        let config = Config::from_toml_str("[input]\nbuffer_size = 2\n").unwrap();
        assert_eq!(config.input.effective_buffer_size(), MIN_BUFFER_SIZE);
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = Config::from_toml_str("[workers]\npoll_interval_secs = 0\n").unwrap();
        assert_eq!(config.workers.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("[input]\nbuffer_size = \"big\"\n").is_err());
    }
}
