//! TOML-based application settings.
//!
//! Stores the sync and notification preferences the core consumes:
//! whether calendar sync is enabled, the reminder lead time, and the
//! pass debounce/timeout tuning.
//!
//! Settings are stored at `~/.config/taskmaster/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::reminders::ReminderLead;
use crate::sync::SyncConfig;

/// Calendar sync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Gates whether any reconciliation pass runs at all.
    #[serde(default)]
    pub enabled: bool,
    /// Reminder lead time in minutes; must be one of 15, 30, 60, 1440.
    #[serde(default = "default_reminder_lead_minutes")]
    pub reminder_lead_minutes: u32,
    /// Window for coalescing rapid sync triggers into a single pass.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Bound on each adapter call; a timeout counts as an adapter error.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            reminder_lead_minutes: default_reminder_lead_minutes(),
            debounce_ms: default_debounce_ms(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// Notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for NotificationsSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_reminder_lead_minutes() -> u32 {
    30
}

fn default_debounce_ms() -> u64 {
    3000
}

fn default_call_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

/// Application settings.
///
/// Serialized to/from TOML at `~/.config/taskmaster/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub notifications: NotificationsSettings,
}

impl Settings {
    /// Load settings from the default location; missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/taskmaster"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Build the per-pass sync configuration from these settings.
    ///
    /// Validates the reminder lead against the enumerated set.
    pub fn sync_config(&self) -> Result<SyncConfig, ConfigError> {
        let lead = ReminderLead::try_from(self.sync.reminder_lead_minutes).map_err(|_| {
            ConfigError::InvalidValue {
                key: "sync.reminder_lead_minutes".to_string(),
                message: format!(
                    "{} is not one of 15, 30, 60, 1440",
                    self.sync.reminder_lead_minutes
                ),
            }
        })?;
        Ok(SyncConfig {
            calendar_sync_enabled: self.sync.enabled,
            reminder_lead: lead,
            call_timeout: Duration::from_secs(self.sync.call_timeout_secs),
            debounce: Duration::from_millis(self.sync.debounce_ms),
        })
    }
}
