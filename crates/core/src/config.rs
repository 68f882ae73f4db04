//! TOML-based configuration for migration runs.
//!
//! A config file looks like:
//!
//! ```toml
//! [source]
//! config_path = "/srv/legacy/config.yml"
//!
//! [storage]
//! data_dir = "/var/lib/permigrate"
//!
//! [progress]
//! group_notify_interval = 1
//! user_notify_interval = 500
//! ```
//!
//! Every section except `source` is optional and falls back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Legacy source settings.
    pub source: SourceConfig,

    /// Destination store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Progress reporting settings.
    #[serde(default)]
    pub progress: ProgressConfig,
}

impl MigrationConfig {
    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        info!(path = %path.display(), "loading configuration");
        let contents = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value constraints that serde alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.config_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "source.config_path".into(),
                detail: "must not be empty".into(),
            });
        }
        if self.progress.group_notify_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "progress.group_notify_interval".into(),
                detail: "must be at least 1".into(),
            });
        }
        if self.progress.user_notify_interval == 0 {
            return Err(ConfigError::InvalidValue {
                field: "progress.user_notify_interval".into(),
                detail: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Legacy source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the legacy plugin's configuration file.
    pub config_path: PathBuf,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Destination store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for persisted holder records.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/permigrate")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress reporting settings.
///
/// Groups are few and individually interesting; users number in the
/// thousands, so their notifications are batched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Emit a progress notification every N groups (default 1).
    #[serde(default = "default_group_interval")]
    pub group_notify_interval: u64,

    /// Emit a progress notification every N users (default 500).
    #[serde(default = "default_user_interval")]
    pub user_notify_interval: u64,
}

fn default_group_interval() -> u64 {
    1
}
fn default_user_interval() -> u64 {
    500
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            group_notify_interval: default_group_interval(),
            user_notify_interval: default_user_interval(),
        }
    }
}
