//! Calendar sync commands.
//!
//! `sync run` exercises a full reconciliation pass from the shell against a
//! JSON task snapshot. The CLI has no device calendar, so the pass runs
//! against console adapters that print each operation and mint local event
//! ids; the committed mapping is the real one under the data dir, which
//! makes repeated runs show the idempotent behavior directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::Subcommand;
use std::path::PathBuf;
use std::sync::Arc;

use taskmaster_core::sync::reconciler::classify;
use taskmaster_core::{
    AdapterError, CalendarAdapter, MappingStore, NotificationAdapter, PassResult, Settings,
    SyncEngine, Task,
};

/// Prints operations and mints local event ids.
struct ConsoleCalendar;

#[async_trait]
impl CalendarAdapter for ConsoleCalendar {
    async fn create_event(&self, task: &Task) -> Result<String, AdapterError> {
        let event_id = format!("local-{}", uuid::Uuid::new_v4());
        println!("create  {:<24} -> {event_id}", task.title);
        Ok(event_id)
    }

    async fn update_event(&self, event_id: &str, task: &Task) -> Result<(), AdapterError> {
        println!("update  {:<24} -> {event_id}", task.title);
        Ok(())
    }

    async fn remove_event(&self, event_id: &str) -> Result<(), AdapterError> {
        println!("remove  {event_id}");
        Ok(())
    }
}

struct ConsoleNotifier;

#[async_trait]
impl NotificationAdapter for ConsoleNotifier {
    async fn schedule(&self, task: &Task, fire_at: DateTime<Utc>) -> Result<String, AdapterError> {
        let id = format!("notif-{}", uuid::Uuid::new_v4());
        println!("remind  {:<24} at {}", task.title, fire_at.to_rfc3339());
        Ok(id)
    }

    async fn cancel(&self, notification_id: &str) {
        println!("cancel  {notification_id}");
    }
}

#[derive(Subcommand)]
pub enum SyncAction {
    /// Run one reconciliation pass over a task snapshot
    Run {
        /// JSON file containing the task array
        #[arg(long)]
        tasks: PathBuf,
        /// Print the per-task plan without calling adapters or committing
        #[arg(long)]
        dry_run: bool,
    },
    /// Show sync status
    Status,
}

pub async fn run(action: SyncAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SyncAction::Run { tasks, dry_run } => run_pass(&tasks, dry_run).await,
        SyncAction::Status => show_status(),
    }
}

async fn run_pass(tasks_path: &PathBuf, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(tasks_path)?;
    let tasks: Vec<Task> = serde_json::from_str(&content)?;
    for task in &tasks {
        task.validate()?;
    }

    let settings = Settings::load()?;
    let config = settings.sync_config()?;
    if !config.calendar_sync_enabled {
        println!("calendar sync is disabled (taskmaster-cli config set sync.enabled true)");
        return Ok(());
    }

    let store = MappingStore::new();
    if dry_run {
        let mapping = store.load()?;
        for task in &tasks {
            println!("{:<8} {}", format!("{:?}", classify(task, &mapping)), task.title);
        }
        println!("dry run: nothing was called or committed");
        return Ok(());
    }

    let engine = SyncEngine::new(Arc::new(ConsoleCalendar), Arc::new(ConsoleNotifier), store);
    match engine.run_pass(&tasks, &config, Utc::now()).await? {
        PassResult::Completed { summary, .. } => {
            println!("{}", summary.message());
            for failure in &summary.failed {
                println!("failed  {} ({:?}): {}", failure.task_id, failure.operation, failure.message);
            }
        }
        PassResult::AlreadyRunning => println!("a pass is already running"),
    }
    Ok(())
}

fn show_status() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    let mapping = MappingStore::new().load()?;

    println!(
        "sync:     {}",
        if settings.sync.enabled { "enabled" } else { "disabled" }
    );
    println!("reminder: {} minutes before", settings.sync.reminder_lead_minutes);
    println!("mapped:   {} task(s)", mapping.len());
    Ok(())
}
