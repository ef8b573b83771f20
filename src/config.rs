//! Configuration management.

use crate::error::{DockyardError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent configuration for dockyard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root directory for persistent mounts.
    pub persistent_folders: PathBuf,
    /// Root directory for sync-mount caches.
    pub sync_folders: PathBuf,
    /// Directory of the shared manifest (helper systems for remote fetches).
    pub shared_path: PathBuf,
    /// Name of the helper system inside the shared manifest.
    pub shared_system: String,
    pub log_level: String,
    pub telemetry_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            persistent_folders: paths::persistent_dir(),
            sync_folders: paths::sync_dir(),
            shared_path: paths::shared_dir(),
            shared_system: "base".to_string(),
            log_level: "info".to_string(),
            telemetry_enabled: false,
        }
    }
}

impl Config {
    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        paths::data_dir().join("config.json")
    }

    /// Load configuration from disk, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| DockyardError::InvalidConfig {
            reason: format!("Failed to read config: {}", e),
        })?;
        serde_json::from_str(&content).map_err(|e| DockyardError::InvalidConfig {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DockyardError::IoError { path: parent.to_path_buf(), source: e })?;
        }
        let content =
            serde_json::to_string_pretty(self).map_err(|e| DockyardError::InvalidConfig {
                reason: format!("Failed to serialize config: {}", e),
            })?;
        std::fs::write(&path, content).map_err(|e| DockyardError::IoError { path, source: e })
    }
}
