//! Reminder notification glue.
//!
//! Computes when a task's reminder should fire and keeps the local
//! notification scheduler converged with task state. Scheduling failures at
//! edit time are surfaced to the caller; failures during a pass-time sweep
//! are recorded and retried on the next pass, the same self-healing pattern
//! the calendar reconciler uses.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::sync::adapters::NotificationAdapter;
use crate::sync::types::{AdapterError, ReminderUpdate, SyncFailure, SyncOperation};
use crate::task::Task;

/// How far before the due date a reminder fires.
///
/// Drawn from a small enumerated set; serialized as the minute count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ReminderLead {
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    OneDay,
}

impl ReminderLead {
    /// Lead time in minutes.
    pub fn minutes(self) -> u32 {
        match self {
            ReminderLead::FifteenMinutes => 15,
            ReminderLead::ThirtyMinutes => 30,
            ReminderLead::OneHour => 60,
            ReminderLead::OneDay => 1440,
        }
    }

    /// Lead time as a chrono duration.
    pub fn duration(self) -> Duration {
        Duration::minutes(i64::from(self.minutes()))
    }

    /// Settings-screen label.
    pub fn label(self) -> &'static str {
        match self {
            ReminderLead::FifteenMinutes => "15 minutes before",
            ReminderLead::ThirtyMinutes => "30 minutes before",
            ReminderLead::OneHour => "1 hour before",
            ReminderLead::OneDay => "1 day before",
        }
    }

    /// All supported leads, in ascending order.
    pub fn all() -> [ReminderLead; 4] {
        [
            ReminderLead::FifteenMinutes,
            ReminderLead::ThirtyMinutes,
            ReminderLead::OneHour,
            ReminderLead::OneDay,
        ]
    }
}

impl Default for ReminderLead {
    fn default() -> Self {
        ReminderLead::ThirtyMinutes
    }
}

impl TryFrom<u32> for ReminderLead {
    type Error = String;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        match minutes {
            15 => Ok(ReminderLead::FifteenMinutes),
            30 => Ok(ReminderLead::ThirtyMinutes),
            60 => Ok(ReminderLead::OneHour),
            1440 => Ok(ReminderLead::OneDay),
            other => Err(format!("unsupported reminder lead: {other} minutes")),
        }
    }
}

impl From<ReminderLead> for u32 {
    fn from(lead: ReminderLead) -> u32 {
        lead.minutes()
    }
}

/// When the task's reminder should fire.
///
/// An explicit `reminder_time` on the task overrides the configured lead;
/// otherwise the reminder fires `lead` before the due date. `None` when the
/// task has no due date.
pub fn fire_at(task: &Task, lead: ReminderLead) -> Option<DateTime<Utc>> {
    task.reminder_time
        .or_else(|| task.due_date.map(|due| due - lead.duration()))
}

/// Result of a pass-time reminder sweep.
#[derive(Debug, Default)]
pub struct ReminderSweep {
    /// Notification-id changes for the task store to persist.
    pub updates: Vec<ReminderUpdate>,
    /// Schedule failures; retried on the next pass.
    pub failed: Vec<SyncFailure>,
}

/// Keeps the notification scheduler converged with task state.
pub struct ReminderScheduler {
    notifier: Arc<dyn NotificationAdapter>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn NotificationAdapter>) -> Self {
        Self { notifier }
    }

    /// Task-edit-time glue: cancel the previous notification, then schedule
    /// the new one when the task still wants a reminder.
    ///
    /// Returns the notification id the task store should persist (`None`
    /// when no reminder applies). A schedule failure is returned to the
    /// caller -- this runs in response to an explicit user action, the one
    /// place a failure notice is shown.
    pub async fn on_task_saved(
        &self,
        task: &Task,
        lead: ReminderLead,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AdapterError> {
        if let Some(id) = &task.notification_id {
            self.notifier.cancel(id).await;
        }

        if !(task.reminder_enabled && task.is_syncable()) {
            return Ok(None);
        }
        let Some(at) = fire_at(task, lead) else {
            return Ok(None);
        };
        if at <= now {
            debug!(task_id = %task.id, "reminder fire time already passed, not scheduling");
            return Ok(None);
        }

        let id = self.notifier.schedule(task, at).await?;
        Ok(Some(id))
    }

    /// Pass-time sweep: schedule reminders that should exist but do not
    /// (a previously failed schedule), cancel ones that no longer apply.
    ///
    /// Failures are recorded, not surfaced; the next pass re-attempts.
    pub async fn sweep(
        &self,
        tasks: &[Task],
        lead: ReminderLead,
        now: DateTime<Utc>,
    ) -> ReminderSweep {
        let mut sweep = ReminderSweep::default();

        for task in tasks {
            let wants_reminder = task.reminder_enabled && task.is_syncable();

            if wants_reminder && task.notification_id.is_none() {
                let Some(at) = fire_at(task, lead) else {
                    continue;
                };
                if at <= now {
                    continue;
                }
                match self.notifier.schedule(task, at).await {
                    Ok(id) => {
                        debug!(task_id = %task.id, notification_id = %id, "reminder scheduled");
                        sweep.updates.push(ReminderUpdate {
                            task_id: task.id.clone(),
                            notification_id: Some(id),
                        });
                    }
                    Err(e) => {
                        warn!(task_id = %task.id, error = %e, "reminder scheduling failed");
                        sweep.failed.push(SyncFailure {
                            task_id: task.id.clone(),
                            operation: SyncOperation::ScheduleReminder,
                            message: e.to_string(),
                        });
                    }
                }
            } else if !wants_reminder {
                if let Some(id) = &task.notification_id {
                    self.notifier.cancel(id).await;
                    sweep.updates.push(ReminderUpdate {
                        task_id: task.id.clone(),
                        notification_id: None,
                    });
                }
            }
        }

        sweep
    }
}
