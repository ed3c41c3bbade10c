//! Configuration structs for history depth and crash-recovery behaviour.
//!
//! All limits that the editor treats as policy (undo depth, recovery snapshot
//! rotation, recovery interval) live here so hosts can tune them without
//! touching the state or persistence crates.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

/// Default number of undo entries kept by the history engine.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Default number of recovery snapshots retained before the oldest is evicted.
pub const DEFAULT_RECOVERY_SNAPSHOTS: usize = 10;

/// Default period between automatic recovery snapshots (five minutes).
pub const DEFAULT_RECOVERY_INTERVAL_SECS: u64 = 300;

/// Top-level editor configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Release version of the running application, compared against the
    /// `version` field of project files when loading.
    pub app_version: String,
    pub history: HistoryConfig,
    pub recovery: RecoveryConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            history: HistoryConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Load a config from a JSON file, falling back to defaults when the file
    /// does not exist. A file that exists but cannot be parsed is an error.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded editor config");
        Ok(config)
    }

    /// Reject limits that would make the history or recovery machinery inert.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.history.max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "history.max_entries",
                reason: "must be at least 1".into(),
            });
        }
        if self.recovery.max_snapshots == 0 {
            return Err(ConfigError::Invalid {
                field: "recovery.max_snapshots",
                reason: "must be at least 1".into(),
            });
        }
        if self.recovery.interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "recovery.interval_secs",
                reason: "must be greater than zero".into(),
            });
        }
        if self.app_version.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "app_version",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

/// Undo/redo history limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo entries; the oldest is evicted beyond this.
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_HISTORY_DEPTH,
        }
    }
}

/// Crash-recovery snapshot policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Rotation cap for persisted recovery snapshots.
    pub max_snapshots: usize,
    /// Seconds between automatic snapshots.
    pub interval_secs: u64,
    /// Directory holding the recovery snapshot list and session flags.
    pub storage_dir: PathBuf,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_snapshots: DEFAULT_RECOVERY_SNAPSHOTS,
            interval_secs: DEFAULT_RECOVERY_INTERVAL_SECS,
            storage_dir: default_recovery_dir(),
        }
    }
}

impl RecoveryConfig {
    /// The snapshot period as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Platform-appropriate directory for recovery data.
fn default_recovery_dir() -> PathBuf {
    let base = if cfg!(target_os = "windows") {
        std::env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    } else if cfg!(target_os = "macos") {
        home_relative("Library/Application Support")
    } else {
        std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_relative(".local/share"))
    };

    base.join("Sequencer").join("recovery")
}

fn home_relative(subpath: &str) -> PathBuf {
    std::env::var("HOME")
        .map(|h| PathBuf::from(h).join(subpath))
        .unwrap_or_else(|_| PathBuf::from(".").join(subpath))
}
