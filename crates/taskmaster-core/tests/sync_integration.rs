//! End-to-end reconciliation tests over the public API.
//!
//! Drives the sync engine the way the host application would: a task store
//! snapshot, a durable mapping document in a temp dir, and mock adapters
//! standing in for the device calendar and notification scheduler.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use taskmaster_core::{
    AdapterError, CalendarAdapter, MappingStore, NotificationAdapter, PassResult, RecurrenceRule,
    SyncConfig, SyncEngine, Task,
};

/// In-memory device calendar: events by id, with injectable failure.
#[derive(Default)]
struct FakeCalendar {
    events: Mutex<HashMap<String, String>>,
    next_id: AtomicUsize,
    offline: AtomicBool,
}

impl FakeCalendar {
    fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), AdapterError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AdapterError::Calendar("device offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CalendarAdapter for FakeCalendar {
    async fn create_event(&self, task: &Task) -> Result<String, AdapterError> {
        self.check_online()?;
        let id = format!("event-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.events
            .lock()
            .unwrap()
            .insert(id.clone(), task.title.clone());
        Ok(id)
    }

    async fn update_event(&self, event_id: &str, task: &Task) -> Result<(), AdapterError> {
        self.check_online()?;
        let mut events = self.events.lock().unwrap();
        match events.get_mut(event_id) {
            Some(title) => {
                *title = task.title.clone();
                Ok(())
            }
            None => Err(AdapterError::Calendar(format!("no such event {event_id}"))),
        }
    }

    async fn remove_event(&self, event_id: &str) -> Result<(), AdapterError> {
        self.check_online()?;
        self.events.lock().unwrap().remove(event_id);
        Ok(())
    }
}

#[derive(Default)]
struct FakeNotifier {
    scheduled: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

#[async_trait]
impl NotificationAdapter for FakeNotifier {
    async fn schedule(
        &self,
        _task: &Task,
        _fire_at: DateTime<Utc>,
    ) -> Result<String, AdapterError> {
        let id = format!("notif-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.scheduled.lock().unwrap().push(id.clone());
        Ok(id)
    }

    async fn cancel(&self, notification_id: &str) {
        self.scheduled
            .lock()
            .unwrap()
            .retain(|id| id != notification_id);
    }
}

fn utc(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).unwrap()
}

fn task(id: &str, due: DateTime<Utc>) -> Task {
    let mut t = Task::new(format!("Task {id}"), utc(1, 8));
    t.id = id.to_string();
    t.due_date = Some(due);
    t
}

fn engine(dir: &TempDir, calendar: &Arc<FakeCalendar>, notifier: &Arc<FakeNotifier>) -> SyncEngine {
    SyncEngine::new(
        calendar.clone(),
        notifier.clone(),
        MappingStore::new_with_path(dir.path().join("calendar_mapping.json")),
    )
}

fn enabled() -> SyncConfig {
    SyncConfig {
        calendar_sync_enabled: true,
        ..SyncConfig::default()
    }
}

fn summary_of(result: PassResult) -> taskmaster_core::PassSummary {
    match result {
        PassResult::Completed { summary, .. } => summary,
        PassResult::AlreadyRunning => panic!("pass did not run"),
    }
}

#[tokio::test]
async fn full_lifecycle_converges() {
    let dir = TempDir::new().unwrap();
    let calendar = Arc::new(FakeCalendar::default());
    let notifier = Arc::new(FakeNotifier::default());
    let engine = engine(&dir, &calendar, &notifier);
    let config = enabled();

    // A recurring task with a reminder, and a plain one.
    let mut standup = task("standup", utc(4, 9));
    standup.recurrence = RecurrenceRule::weekly(1);
    standup.reminder_enabled = true;
    let errand = task("errand", utc(5, 12));

    // Pass 1: both events created, reminder scheduled.
    let summary = summary_of(
        engine
            .run_pass(&[standup.clone(), errand.clone()], &config, utc(1, 9))
            .await
            .unwrap(),
    );
    assert_eq!(summary.created.len(), 2);
    assert_eq!(calendar.event_count(), 2);
    assert_eq!(summary.reminders.len(), 1);
    assert_eq!(summary.reminders[0].task_id, "standup");

    // The task store persists the notification id.
    standup.notification_id = summary.reminders[0].notification_id.clone();

    // Pass 2: nothing changed, nothing happens.
    let summary = summary_of(
        engine
            .run_pass(&[standup.clone(), errand.clone()], &config, utc(1, 10))
            .await
            .unwrap(),
    );
    assert_eq!(summary.total_operations(), 0);
    assert!(summary.reminders.is_empty());

    // Completing the recurring task spawns its next instance.
    standup.completed = true;
    let next = standup.next_instance(utc(4, 10)).unwrap();
    assert_eq!(next.due_date, Some(utc(11, 9)));

    let snapshot = vec![standup.clone(), next.clone(), errand.clone()];
    let summary = summary_of(engine.run_pass(&snapshot, &config, utc(4, 11)).await.unwrap());

    // The completed instance's event is removed, the next one created,
    // its stale reminder cancelled and the new instance's scheduled.
    assert_eq!(summary.removed, vec!["standup".to_string()]);
    assert_eq!(summary.created, vec![next.id.clone()]);
    assert_eq!(calendar.event_count(), 2);
    let reminder_tasks: Vec<_> = summary.reminders.iter().map(|r| r.task_id.clone()).collect();
    assert!(reminder_tasks.contains(&standup.id));
    assert!(reminder_tasks.contains(&next.id));
}

#[tokio::test]
async fn outage_heals_on_a_later_pass() {
    let dir = TempDir::new().unwrap();
    let calendar = Arc::new(FakeCalendar::default());
    let notifier = Arc::new(FakeNotifier::default());
    let engine = engine(&dir, &calendar, &notifier);
    let config = enabled();
    let tasks = vec![task("a", utc(4, 9)), task("b", utc(5, 9))];

    // Calendar is unreachable: the pass records failures, maps nothing.
    calendar.set_offline(true);
    let summary = summary_of(engine.run_pass(&tasks, &config, utc(1, 9)).await.unwrap());
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(calendar.event_count(), 0);

    // Back online: the next pass creates exactly one event per task.
    calendar.set_offline(false);
    let summary = summary_of(engine.run_pass(&tasks, &config, utc(1, 10)).await.unwrap());
    assert_eq!(summary.created.len(), 2);
    assert_eq!(calendar.event_count(), 2);

    // And the pass after that is quiet.
    let summary = summary_of(engine.run_pass(&tasks, &config, utc(1, 11)).await.unwrap());
    assert_eq!(summary.total_operations(), 0);
}

#[tokio::test]
async fn mapping_survives_restart() {
    let dir = TempDir::new().unwrap();
    let calendar = Arc::new(FakeCalendar::default());
    let notifier = Arc::new(FakeNotifier::default());
    let config = enabled();
    let tasks = vec![task("a", utc(4, 9))];

    let first = engine(&dir, &calendar, &notifier);
    summary_of(first.run_pass(&tasks, &config, utc(1, 9)).await.unwrap());
    drop(first);

    // A fresh engine over the same data dir picks up the committed mapping:
    // no duplicate create for the already-synced task.
    let second = engine(&dir, &calendar, &notifier);
    let summary = summary_of(second.run_pass(&tasks, &config, utc(1, 10)).await.unwrap());
    assert_eq!(summary.total_operations(), 0);
    assert_eq!(calendar.event_count(), 1);
}

#[tokio::test]
async fn disabling_sync_stops_all_adapter_traffic() {
    let dir = TempDir::new().unwrap();
    let calendar = Arc::new(FakeCalendar::default());
    let notifier = Arc::new(FakeNotifier::default());
    let engine = engine(&dir, &calendar, &notifier);

    let mut config = enabled();
    let tasks = vec![task("a", utc(4, 9))];
    summary_of(engine.run_pass(&tasks, &config, utc(1, 9)).await.unwrap());
    assert_eq!(calendar.event_count(), 1);

    // Sync turned off: mutate tasks all we want, nothing reaches adapters.
    config.calendar_sync_enabled = false;
    let mut mutated = tasks.clone();
    mutated[0].title = "Changed".to_string();
    mutated.push(task("b", utc(6, 9)));

    let summary = summary_of(engine.run_pass(&mutated, &config, utc(1, 10)).await.unwrap());
    assert_eq!(summary.total_operations(), 0);
    assert_eq!(calendar.event_count(), 1);
}
