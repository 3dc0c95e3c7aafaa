//! One reconciliation pass between local tasks and the external mirrors.
//!
//! The reconciler compares the current task snapshot against the previously
//! committed mapping, drives the calendar adapter per task, and returns the
//! new mapping plus an explicit [`PassSummary`]. Each task is processed
//! independently: one adapter failure never blocks or rolls back the rest,
//! and a failed call leaves the mapping exactly as it was before the call,
//! so the next pass naturally re-attempts it. There is no in-pass retry.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::reminders::ReminderScheduler;
use crate::sync::adapters::{CalendarAdapter, NotificationAdapter};
use crate::sync::mapping::{EventMapping, MappingEntry};
use crate::sync::types::{AdapterError, PassSummary, SyncConfig, SyncFailure, SyncOperation};
use crate::task::Task;

/// What a pass should do for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    /// Active task with no entry: create its event.
    Create,
    /// Active task whose mirrored fields changed: overwrite its event.
    Update,
    /// Completed or due-date-cleared task with an entry: remove its event.
    Remove,
    /// Nothing to do.
    Skip,
}

/// Classify one task against the previously committed mapping.
///
/// Pure; the reconciler applies the resulting action with adapter calls.
pub fn classify(task: &Task, mapping: &EventMapping) -> TaskAction {
    match (task.is_syncable(), mapping.get(&task.id)) {
        (true, None) => TaskAction::Create,
        (true, Some(entry)) if entry.is_current(task) => TaskAction::Skip,
        (true, Some(_)) => TaskAction::Update,
        (false, Some(_)) => TaskAction::Remove,
        (false, None) => TaskAction::Skip,
    }
}

/// Result of one reconciliation pass.
#[derive(Debug)]
pub struct PassOutcome {
    /// The mapping to commit; reflects every successful operation and
    /// nothing else.
    pub mapping: EventMapping,
    pub summary: PassSummary,
}

/// Drives one reconciliation pass against the calendar and notification
/// adapters. Local task state is authoritative; events are overwritten,
/// never merged.
pub struct SyncReconciler {
    calendar: Arc<dyn CalendarAdapter>,
    reminders: ReminderScheduler,
}

impl SyncReconciler {
    pub fn new(calendar: Arc<dyn CalendarAdapter>, notifier: Arc<dyn NotificationAdapter>) -> Self {
        Self {
            calendar,
            reminders: ReminderScheduler::new(notifier),
        }
    }

    /// Run one pass over `tasks` against `previous`.
    ///
    /// With `calendar_sync_enabled == false` this makes zero adapter calls
    /// and returns the mapping unchanged. Each adapter call is bounded by
    /// `config.call_timeout`; a timeout is recorded like any other adapter
    /// error.
    pub async fn reconcile(
        &self,
        tasks: &[Task],
        previous: &EventMapping,
        config: &SyncConfig,
        now: DateTime<Utc>,
    ) -> PassOutcome {
        if !config.calendar_sync_enabled {
            return PassOutcome {
                mapping: previous.clone(),
                summary: PassSummary::empty(now),
            };
        }

        let mut mapping = previous.clone();
        let mut summary = PassSummary::empty(now);

        for task in tasks {
            match classify(task, &mapping) {
                TaskAction::Skip => {}
                TaskAction::Create => {
                    let call = bounded(config.call_timeout, self.calendar.create_event(task));
                    match call.await {
                        Ok(event_id) => {
                            debug!(task_id = %task.id, event_id = %event_id, "event created");
                            mapping.insert(task.id.clone(), MappingEntry::for_task(event_id, task));
                            summary.created.push(task.id.clone());
                        }
                        Err(e) => record_failure(&mut summary, task.id.clone(), SyncOperation::Create, e),
                    }
                }
                TaskAction::Update => {
                    let Some(event_id) = mapping.event_id(&task.id).map(str::to_owned) else {
                        continue;
                    };
                    let call = bounded(config.call_timeout, self.calendar.update_event(&event_id, task));
                    match call.await {
                        Ok(()) => {
                            debug!(task_id = %task.id, event_id = %event_id, "event overwritten");
                            mapping.insert(task.id.clone(), MappingEntry::for_task(event_id, task));
                            summary.updated.push(task.id.clone());
                        }
                        Err(e) => record_failure(&mut summary, task.id.clone(), SyncOperation::Update, e),
                    }
                }
                TaskAction::Remove => {
                    self.remove_entry(&mut mapping, &mut summary, &task.id, config).await;
                }
            }
        }

        // Entries whose task vanished from the snapshot (task deleted).
        let current_ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let orphaned: Vec<String> = mapping
            .task_ids()
            .filter(|id| !current_ids.contains(id))
            .map(str::to_owned)
            .collect();
        for task_id in orphaned {
            self.remove_entry(&mut mapping, &mut summary, &task_id, config).await;
        }

        let sweep = self.reminders.sweep(tasks, config.reminder_lead, now).await;
        summary.reminders = sweep.updates;
        summary.failed.extend(sweep.failed);

        PassOutcome { mapping, summary }
    }

    /// Remove one task's event; the entry is dropped only on success so a
    /// failed remove is retried next pass.
    async fn remove_entry(
        &self,
        mapping: &mut EventMapping,
        summary: &mut PassSummary,
        task_id: &str,
        config: &SyncConfig,
    ) {
        let Some(event_id) = mapping.event_id(task_id).map(str::to_owned) else {
            return;
        };
        match bounded(config.call_timeout, self.calendar.remove_event(&event_id)).await {
            Ok(()) => {
                debug!(task_id = %task_id, event_id = %event_id, "event removed");
                mapping.remove(task_id);
                summary.removed.push(task_id.to_string());
            }
            Err(e) => record_failure(summary, task_id.to_string(), SyncOperation::Remove, e),
        }
    }
}

fn record_failure(
    summary: &mut PassSummary,
    task_id: String,
    operation: SyncOperation,
    error: AdapterError,
) {
    warn!(task_id = %task_id, ?operation, error = %error, "adapter call failed, will retry next pass");
    summary.failed.push(SyncFailure {
        task_id,
        operation,
        message: error.to_string(),
    });
}

/// Bound an adapter call; elapsed time is reported as an [`AdapterError`].
async fn bounded<T>(
    timeout: Duration,
    call: impl Future<Output = Result<T, AdapterError>>,
) -> Result<T, AdapterError> {
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::Timeout {
            seconds: timeout.as_secs(),
        }),
    }
}
