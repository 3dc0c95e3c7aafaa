//! Core error types for taskmaster-core.
//!
//! This module defines the error hierarchy using thiserror. Adapter-level
//! errors live in [`crate::sync::types::AdapterError`] next to the sync
//! machinery that produces them.

use std::path::PathBuf;
use thiserror::Error;

use crate::sync::types::AdapterError;

/// Core error type for taskmaster-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Validation errors (malformed recurrence rule, cross-field task invariants)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Calendar or notification adapter failures
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// Mapping document load/save errors
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Validation errors.
///
/// Raised synchronously at task-edit time, before any scheduling or
/// external call. A validation failure blocks the originating save.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Custom recurrence with no weekdays selected
    #[error("Custom recurrence requires at least one weekday")]
    EmptyCustomDays,

    /// Weekday outside 0 (Sun) ..= 6 (Sat)
    #[error("Invalid weekday {day}: must be 0 (Sun) through 6 (Sat)")]
    InvalidWeekday { day: u8 },

    /// Interval below 1 for daily/weekly/monthly rules
    #[error("Recurrence interval must be at least 1, got {interval}")]
    InvalidInterval { interval: u32 },

    /// Repeating rule on a task without a due date
    #[error("A repeating task requires a due date")]
    RecurrenceWithoutDueDate,

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Mapping document errors.
#[derive(Error, Debug)]
pub enum MappingError {
    /// Failed to read the mapping document
    #[error("Failed to load mapping from {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the mapping document
    #[error("Failed to save mapping to {path}: {source}")]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The mapping document exists but does not parse
    #[error("Mapping document at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
