//! Pass orchestration: trigger coalescing, serialization, and commit.
//!
//! Passes are event-triggered (task list changed, sync toggled) and must
//! never race on the mapping store. The engine serializes them behind an
//! in-flight guard, coalesces rapid triggers through a debounce window, and
//! commits the rewritten mapping only after every per-task operation has
//! resolved. The caller drives the clock: triggers and pass runs take an
//! explicit `now`, which keeps the engine deterministic under test.

use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::error::CoreError;
use crate::sync::adapters::{CalendarAdapter, NotificationAdapter};
use crate::sync::mapping::MappingStore;
use crate::sync::reconciler::SyncReconciler;
use crate::sync::types::{PassSummary, SyncConfig, SyncStatus};
use crate::task::Task;

/// Result of asking the engine to run a pass.
#[derive(Debug)]
pub enum PassResult {
    /// The pass ran to completion and the mapping was committed.
    Completed {
        summary: PassSummary,
        /// A trigger arrived while this pass was in flight; the caller
        /// should run another pass once it is ready.
        rerun_needed: bool,
    },
    /// A pass is already in flight; this trigger was queued, not dropped.
    AlreadyRunning,
}

/// Serializes reconciliation passes over one mapping store.
pub struct SyncEngine {
    reconciler: SyncReconciler,
    store: MappingStore,
    in_flight: tokio::sync::Mutex<()>,
    /// Trigger arrived while a pass held the guard.
    pending: AtomicBool,
    /// Trigger arrived and has not been consumed by a pass yet.
    dirty: AtomicBool,
    debounce_until: Mutex<Option<DateTime<Utc>>>,
    last_sync_at: Mutex<Option<DateTime<Utc>>>,
}

impl SyncEngine {
    pub fn new(
        calendar: Arc<dyn CalendarAdapter>,
        notifier: Arc<dyn NotificationAdapter>,
        store: MappingStore,
    ) -> Self {
        Self {
            reconciler: SyncReconciler::new(calendar, notifier),
            store,
            in_flight: tokio::sync::Mutex::new(()),
            pending: AtomicBool::new(false),
            dirty: AtomicBool::new(false),
            debounce_until: Mutex::new(None),
            last_sync_at: Mutex::new(None),
        }
    }

    /// Note that local state changed and a pass is wanted.
    ///
    /// Rapid triggers coalesce: each one pushes the debounce window out, so
    /// a burst of task mutations results in a single pass.
    pub fn request_sync(&self, now: DateTime<Utc>, config: &SyncConfig) {
        self.dirty.store(true, Ordering::SeqCst);
        let window = Duration::from_std(config.debounce).unwrap_or_else(|_| Duration::seconds(3));
        *self.debounce_until.lock().unwrap() = Some(now + window);
    }

    /// Whether a coalesced pass is ready to run.
    pub fn due(&self, now: DateTime<Utc>) -> bool {
        if !self.dirty.load(Ordering::SeqCst) {
            return false;
        }
        match *self.debounce_until.lock().unwrap() {
            Some(until) => now >= until,
            None => true,
        }
    }

    /// Run one reconciliation pass over `tasks`.
    ///
    /// If a pass is already in flight the trigger is queued and
    /// [`PassResult::AlreadyRunning`] is returned; the in-flight pass
    /// reports `rerun_needed` when it finishes. With sync disabled the pass
    /// completes as a no-op without touching the store.
    pub async fn run_pass(
        &self,
        tasks: &[Task],
        config: &SyncConfig,
        now: DateTime<Utc>,
    ) -> Result<PassResult, CoreError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            self.pending.store(true, Ordering::SeqCst);
            return Ok(PassResult::AlreadyRunning);
        };

        // This pass consumes the outstanding trigger; anything arriving
        // from here on schedules a re-run.
        self.dirty.store(false, Ordering::SeqCst);

        if !config.calendar_sync_enabled {
            return Ok(PassResult::Completed {
                summary: PassSummary::empty(now),
                rerun_needed: self.pending.swap(false, Ordering::SeqCst),
            });
        }

        let previous = self.store.load()?;
        let outcome = self.reconciler.reconcile(tasks, &previous, config, now).await;

        // Commit only after every per-task operation has resolved.
        self.store.replace(&outcome.mapping)?;
        *self.last_sync_at.lock().unwrap() = Some(outcome.summary.completed_at);

        info!(
            created = outcome.summary.created.len(),
            updated = outcome.summary.updated.len(),
            removed = outcome.summary.removed.len(),
            failed = outcome.summary.failed.len(),
            "reconciliation pass committed"
        );

        Ok(PassResult::Completed {
            summary: outcome.summary,
            rerun_needed: self.pending.swap(false, Ordering::SeqCst) || self.dirty.load(Ordering::SeqCst),
        })
    }

    /// Current sync status, for the profile-screen indicator.
    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            last_sync_at: *self.last_sync_at.lock().unwrap(),
            in_progress: self.in_flight.try_lock().is_err(),
            dirty: self.dirty.load(Ordering::SeqCst),
        }
    }
}
