//! Task snapshot types consumed by the sync core.
//!
//! Task CRUD lives in the host application's task store; this module defines
//! the snapshot shape the recurrence engine and reconciler operate on, plus
//! the cross-field invariants enforced at edit time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::recurrence::RecurrenceRule;

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// A task as seen by the sync core.
///
/// Owned by the external task store; the reconciler never mutates tasks,
/// it only reads them and reports what the store should persist
/// (notification ids, next recurring instances).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Optional longer description
    #[serde(default)]
    pub description: Option<String>,
    /// When the task is due
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    /// Whether the task is done
    #[serde(default)]
    pub completed: bool,
    /// How the task repeats
    #[serde(default)]
    pub recurrence: RecurrenceRule,
    /// Whether a reminder notification is wanted
    #[serde(default)]
    pub reminder_enabled: bool,
    /// Explicit reminder fire time, overriding the configured lead
    #[serde(default)]
    pub reminder_time: Option<DateTime<Utc>>,
    /// Id of the currently scheduled notification, if any
    #[serde(default)]
    pub notification_id: Option<String>,
    /// Task priority
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Owning category, if any
    #[serde(default)]
    pub category_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a minimal task with the given title.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            due_date: None,
            completed: false,
            recurrence: RecurrenceRule::never(),
            reminder_enabled: false,
            reminder_time: None,
            notification_id: None,
            priority: None,
            category_id: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Validate the task's cross-field invariants.
    ///
    /// A repeating rule requires a due date, and the rule itself must be
    /// well-formed. Called before the task store persists an edit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.recurrence.validate()?;
        if self.recurrence.is_repeating() && self.due_date.is_none() {
            return Err(ValidationError::RecurrenceWithoutDueDate);
        }
        Ok(())
    }

    /// Whether this task belongs in the external calendar.
    ///
    /// Exactly the tasks with a due date and not completed may hold a
    /// mapping entry.
    pub fn is_syncable(&self) -> bool {
        self.due_date.is_some() && !self.completed
    }

    /// Produce the next instance of a recurring task.
    ///
    /// Called when a repeating task is completed: returns a fresh-id copy
    /// due at the next occurrence, un-completed, with no notification id
    /// (the next reconciliation pass reschedules the reminder). `None` when
    /// the task does not repeat, has no due date, or the rule's end date
    /// has passed.
    pub fn next_instance(&self, now: DateTime<Utc>) -> Option<Task> {
        let due = self.due_date?;
        let next_due = self.recurrence.next_occurrence(due)?;
        Some(Task {
            id: uuid::Uuid::new_v4().to_string(),
            completed: false,
            completed_at: None,
            due_date: Some(next_due),
            notification_id: None,
            created_at: now,
            updated_at: now,
            ..self.clone()
        })
    }
}

/// Supplies the current task snapshot to the reconciler.
///
/// The task store is an external collaborator; the sync core only ever pulls
/// a full snapshot at the start of a pass.
pub trait TaskSource: Send + Sync {
    fn snapshot(&self) -> Vec<Task>;
}

/// Quick due-date presets offered at task creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickDue {
    Today,
    Tomorrow,
    NextWeek,
}

impl QuickDue {
    /// Resolve the preset to a concrete instant: the target date at 09:00.
    pub fn due_at(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let day = match self {
            QuickDue::Today => now,
            QuickDue::Tomorrow => now + Duration::days(1),
            QuickDue::NextWeek => now + Duration::days(7),
        };
        day.date_naive()
            .and_hms_opt(9, 0, 0)
            .expect("09:00:00 is always a valid time")
            .and_utc()
    }
}
