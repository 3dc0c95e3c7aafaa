//! # TaskMaster Core Library
//!
//! Core business logic for TaskMaster's recurrence and synchronization
//! subsystem. Task CRUD, screens, and gamification live in the host
//! application; this library owns the parts that have to be exactly right:
//!
//! - **Recurrence**: a pure rule type with occurrence derivation and
//!   deterministic human descriptions
//! - **Sync**: an idempotent reconciler that mirrors task state into the
//!   device calendar and notification scheduler through capability
//!   adapters, converging under partial failure via re-entrant passes
//! - **Storage**: the durable task-to-event mapping document and TOML
//!   settings
//!
//! ## Key Components
//!
//! - [`RecurrenceRule`]: how a task repeats, and when it next occurs
//! - [`SyncEngine`]: serialized, debounced reconciliation passes
//! - [`SyncReconciler`]: one pass, returning an explicit [`PassSummary`]
//! - [`CalendarAdapter`] / [`NotificationAdapter`]: host-supplied
//!   capability interfaces

pub mod error;
pub mod recurrence;
pub mod reminders;
pub mod storage;
pub mod sync;
pub mod task;

pub use error::{ConfigError, CoreError, MappingError, ValidationError};
pub use recurrence::{RecurrenceRule, RecurrenceType};
pub use reminders::{fire_at, ReminderLead, ReminderScheduler, ReminderSweep};
pub use storage::Settings;
pub use sync::{
    AdapterError, CalendarAdapter, EventMapping, MappingStore, NotificationAdapter, PassResult,
    PassSummary, SyncConfig, SyncEngine, SyncReconciler, SyncStatus,
};
pub use task::{Priority, QuickDue, Task, TaskSource};
