//! Application configuration.
//!
//! The configuration is loaded from a JSON file (by default
//! `$XDG_CONFIG_HOME/winstage/config.json`, or `%APPDATA%\winstage\config.json`
//! on Windows).  Every section is optional so the file can grow without
//! breaking older ones.
//!
//! # Example
//!
//! ```json
//! {
//!   "discovery": { "timeout_ms": 10000, "poll_interval_ms": 50 },
//!   "placement": { "settle_ms": 50 },
//!   "profiles_path": "/home/me/.config/winstage/profiles.json"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
///
/// A minimal `{}` file is valid and all sections fall back to their
/// compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Window discovery budget and polling cadence.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Delays between placement steps.
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Profile store file.  `None` means `profiles.json` next to the
    /// config file.
    #[serde(default)]
    pub profiles_path: Option<PathBuf>,
}

/// Window discovery timing.  All durations are in **milliseconds**.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// How long to wait for a program's window before giving up.
    pub timeout_ms: u64,
    /// Pause between two discovery attempts.
    pub poll_interval_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            poll_interval_ms: 50,
        }
    }
}

impl DiscoveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Placement timing.  All durations are in **milliseconds**.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Time given to the window manager between two placement steps.
    pub settle_ms: u64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self { settle_ms: 50 }
    }
}

impl PlacementConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
