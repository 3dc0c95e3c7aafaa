//! Device calendar synchronization layer.
//!
//! Mirrors local task state into the device calendar through the
//! [`CalendarAdapter`] capability, keyed by a durable task-id to event-id
//! mapping. Reconciliation is idempotent and self-healing: each pass
//! re-derives what the mirrors should look like, and anything a failed
//! call left behind is repaired on the next pass.

pub mod adapters;
pub mod engine;
pub mod mapping;
pub mod reconciler;
pub mod types;


pub use adapters::{CalendarAdapter, NotificationAdapter};
pub use engine::{PassResult, SyncEngine};
pub use mapping::{EventMapping, MappingEntry, MappingStore};
pub use reconciler::{classify, PassOutcome, SyncReconciler, TaskAction};
pub use types::{
    AdapterError, PassSummary, ReminderUpdate, SyncConfig, SyncFailure, SyncOperation, SyncStatus,
};
