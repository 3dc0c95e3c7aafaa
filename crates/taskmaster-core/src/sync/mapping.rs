//! Durable task-id to calendar-event-id mapping.
//!
//! One JSON document under the data dir, loaded once at the start of a
//! reconciliation pass and fully rewritten at the end. The rewrite goes
//! through a temp file and an atomic rename, so a crash mid-pass leaves the
//! last committed mapping intact for the next app start.
//!
//! Each entry also carries a fingerprint of the fields mirrored into the
//! calendar event. A clean pass over unchanged tasks therefore makes zero
//! adapter calls, and a failed update keeps the stale fingerprint so the
//! next pass re-attempts it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::MappingError;
use crate::storage::data_dir;
use crate::task::Task;

/// One task's external calendar representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    /// External calendar event id.
    pub event_id: String,
    /// Fingerprint of the mirrored fields at the last successful write.
    pub fingerprint: String,
}

impl MappingEntry {
    /// Entry recording a successful create/update of `task`'s event.
    pub fn for_task(event_id: impl Into<String>, task: &Task) -> Self {
        Self {
            event_id: event_id.into(),
            fingerprint: sync_fingerprint(task),
        }
    }

    /// Whether the event still mirrors the task's current state.
    pub fn is_current(&self, task: &Task) -> bool {
        self.fingerprint == sync_fingerprint(task)
    }
}

/// Fingerprint of the fields mirrored into the calendar event.
///
/// Title, due date, and description are what the event shows; a change to
/// any of them means the event needs an overwrite.
pub fn sync_fingerprint(task: &Task) -> String {
    format!(
        "{}|{}|{}",
        task.title,
        task.due_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
        task.description.as_deref().unwrap_or_default()
    )
}

/// In-memory dictionary: task id -> [`MappingEntry`].
///
/// One entry per task currently represented in the external calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventMapping {
    entries: HashMap<String, MappingEntry>,
}

impl EventMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_id: &str) -> Option<&MappingEntry> {
        self.entries.get(task_id)
    }

    /// Event id mapped to a task, if any.
    pub fn event_id(&self, task_id: &str) -> Option<&str> {
        self.entries.get(task_id).map(|e| e.event_id.as_str())
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.entries.contains_key(task_id)
    }

    /// Record a task's external representation.
    pub fn insert(&mut self, task_id: impl Into<String>, entry: MappingEntry) {
        self.entries.insert(task_id.into(), entry);
    }

    /// Drop a task's entry, returning what it held.
    pub fn remove(&mut self, task_id: &str) -> Option<MappingEntry> {
        self.entries.remove(task_id)
    }

    /// All mapped task ids.
    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Durable store for the [`EventMapping`] document.
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    /// Store at the default location (`<data_dir>/calendar_mapping.json`).
    pub fn new() -> Self {
        let dir = data_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            path: dir.join("calendar_mapping.json"),
        }
    }

    /// Store at a specific path (for testing).
    pub fn new_with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the last committed mapping. A missing document is an empty
    /// mapping; a document that exists but does not parse is an error.
    pub fn load(&self) -> Result<EventMapping, MappingError> {
        if !self.path.exists() {
            return Ok(EventMapping::new());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| MappingError::LoadFailed {
                path: self.path.clone(),
                source: e,
            })?;
        serde_json::from_str(&content).map_err(|e| MappingError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Atomically replace the document with `mapping`.
    ///
    /// Written to a sibling temp file first, then renamed over the target;
    /// readers never observe a partial document.
    pub fn replace(&self, mapping: &EventMapping) -> Result<(), MappingError> {
        let data = serde_json::to_string_pretty(mapping).map_err(|e| MappingError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        let save_err = |e: std::io::Error| MappingError::SaveFailed {
            path: self.path.clone(),
            source: e,
        };
        std::fs::write(&tmp, data).map_err(save_err)?;
        std::fs::rename(&tmp, &self.path).map_err(save_err)?;
        Ok(())
    }
}

impl Default for MappingStore {
    fn default() -> Self {
        Self::new()
    }
}
