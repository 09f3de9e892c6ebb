//! # Sync Configuration
//!
//! Configuration for the sync engine.
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [remote]
//! base_url = "https://rows.example.com"
//! api_key = "anon-key"
//!
//! [sync]
//! poll_interval_secs = 30
//! batch_size = 100
//! ```
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file (`~/.config/caja-pos/sync.toml` on Linux)
//! 3. Environment variables (`CAJA_REMOTE_URL`, `CAJA_API_KEY`,
//!    `CAJA_POLL_INTERVAL_SECS`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Remote Settings
// =============================================================================

/// Remote row-store endpoint settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Base URL of the remote row store. Sync is disabled when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key sent with every request.
    #[serde(default)]
    pub api_key: String,
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Sync behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Interval between periodic push cycles (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum queue entries drained per push cycle.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_poll_interval() -> u64 {
    30
}

fn default_batch_size() -> u32 {
    100
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            poll_interval_secs: default_poll_interval(),
            batch_size: default_batch_size(),
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote endpoint settings.
    #[serde(default)]
    pub remote: RemoteSettings,

    /// Sync behavior settings.
    #[serde(default)]
    pub sync: SyncSettings,
}

impl SyncConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if let Some(url) = &self.remote.base_url {
            let parsed = Url::parse(url)?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(SyncError::InvalidUrl(format!(
                    "Remote URL must be http(s), got: {}",
                    url
                )));
            }
        }

        if self.sync.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch_size must be greater than 0".into(),
            ));
        }

        if self.sync.poll_interval_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "poll_interval_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CAJA_REMOTE_URL") {
            debug!(url = %url, "Overriding remote URL from environment");
            self.remote.base_url = Some(url);
        }

        if let Ok(key) = std::env::var("CAJA_API_KEY") {
            self.remote.api_key = key;
        }

        if let Ok(interval) = std::env::var("CAJA_POLL_INTERVAL_SECS") {
            if let Ok(secs) = interval.parse::<u64>() {
                self.sync.poll_interval_secs = secs;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "caja", "pos")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    /// True if a remote endpoint is configured at all.
    pub fn is_remote_configured(&self) -> bool {
        self.remote.base_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(config.remote.base_url.is_none());
        assert_eq!(config.sync.poll_interval_secs, 30);
        assert_eq!(config.sync.batch_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.remote.base_url = Some("https://rows.example.com".to_string());
        assert!(config.validate().is_ok());

        config.remote.base_url = Some("ftp://rows.example.com".to_string());
        assert!(config.validate().is_err());

        config.remote.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.remote.base_url = None;
        config.sync.batch_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[sync]"));

        let back: SyncConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.sync.batch_size, config.sync.batch_size);
    }
}
