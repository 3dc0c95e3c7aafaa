//! Core types for calendar synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::reminders::ReminderLead;

/// Adapter error types.
///
/// Raised by calendar and notification adapters; caught per task during a
/// reconciliation pass and never fatal to the pass.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Adapter call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Permission denied by the platform")]
    PermissionDenied,

    #[error("Rate limited")]
    RateLimited,
}

/// Configuration for one reconciliation pass.
///
/// Threaded explicitly into the reconciler so a pass is a pure function of
/// `(tasks, mapping, config)` plus adapter side effects; nothing is read
/// from ambient settings mid-pass.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Gates whether the pass does anything at all.
    pub calendar_sync_enabled: bool,
    /// Lead time for reminder notifications.
    pub reminder_lead: ReminderLead,
    /// Bound on each adapter call; a timeout counts as an adapter error.
    pub call_timeout: Duration,
    /// Window for coalescing rapid triggers into a single pass.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            calendar_sync_enabled: false,
            reminder_lead: ReminderLead::default(),
            call_timeout: Duration::from_secs(10),
            debounce: Duration::from_millis(3000),
        }
    }
}

/// The adapter operation a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Remove,
    ScheduleReminder,
}

/// A per-task failure recorded during a pass.
///
/// The mapping is left exactly as it was before the failed call, so the
/// next pass naturally re-attempts the operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    pub task_id: String,
    pub operation: SyncOperation,
    pub message: String,
}

/// A notification-id change the task store should persist.
///
/// `notification_id == None` means the previous notification was cancelled
/// and nothing replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderUpdate {
    pub task_id: String,
    pub notification_id: Option<String>,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassSummary {
    /// Task ids for which an event was created.
    pub created: Vec<String>,
    /// Task ids whose event was overwritten.
    pub updated: Vec<String>,
    /// Task ids whose event was removed (completion, cleared due date,
    /// or deletion).
    pub removed: Vec<String>,
    /// Per-task failures; retried on the next pass.
    pub failed: Vec<SyncFailure>,
    /// Notification-id changes for the task store to persist.
    pub reminders: Vec<ReminderUpdate>,
    /// When the pass finished.
    pub completed_at: DateTime<Utc>,
}

impl PassSummary {
    /// An empty summary, for passes that had nothing to do.
    pub fn empty(completed_at: DateTime<Utc>) -> Self {
        Self {
            created: Vec::new(),
            updated: Vec::new(),
            removed: Vec::new(),
            failed: Vec::new(),
            reminders: Vec::new(),
            completed_at,
        }
    }

    /// Number of successful calendar operations in this pass.
    pub fn total_operations(&self) -> usize {
        self.created.len() + self.updated.len() + self.removed.len()
    }

    /// Whether any per-task operation failed.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Get a human-readable summary message.
    pub fn message(&self) -> String {
        if self.total_operations() == 0 && !self.has_failures() {
            "Calendar already in sync.".to_string()
        } else {
            format!(
                "Synced {} event(s): {} created, {} updated, {} removed ({} failed).",
                self.total_operations(),
                self.created.len(),
                self.updated.len(),
                self.removed.len(),
                self.failed.len()
            )
        }
    }
}

/// Current sync status, as shown in the profile screen indicator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Last successful pass timestamp.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Whether a pass is currently in flight.
    pub in_progress: bool,
    /// Whether a trigger is waiting for the debounce window or for the
    /// in-flight pass to finish.
    pub dirty: bool,
}
