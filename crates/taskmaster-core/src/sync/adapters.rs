//! Capability interfaces for the device calendar and notification scheduler.
//!
//! The host application supplies the implementations; the sync core only
//! ever talks to these traits. Local state is authoritative -- the adapters
//! mirror it outward, never the other way around.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::sync::types::AdapterError;
use crate::task::Task;

/// Wraps the device calendar.
///
/// `create_event` is expected to be idempotent at the adapter boundary:
/// creating an event for a task that already has one (a rare crash-window
/// artifact) must not produce a duplicate the user can see.
#[async_trait]
pub trait CalendarAdapter: Send + Sync {
    /// Create a calendar event for the task, returning the external event id.
    async fn create_event(&self, task: &Task) -> Result<String, AdapterError>;

    /// Overwrite the event with the task's current state. No merge.
    async fn update_event(&self, event_id: &str, task: &Task) -> Result<(), AdapterError>;

    /// Remove the event from the calendar.
    async fn remove_event(&self, event_id: &str) -> Result<(), AdapterError>;
}

/// Wraps the local notification scheduler.
#[async_trait]
pub trait NotificationAdapter: Send + Sync {
    /// Schedule a reminder for the task at `fire_at`, returning the
    /// notification id.
    async fn schedule(&self, task: &Task, fire_at: DateTime<Utc>)
        -> Result<String, AdapterError>;

    /// Cancel a previously scheduled notification. Best-effort: a stale id
    /// on the platform side is harmless.
    async fn cancel(&self, notification_id: &str);
}
