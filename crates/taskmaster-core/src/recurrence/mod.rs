//! Recurrence rules and occurrence derivation.
//!
//! A [`RecurrenceRule`] describes how a task's due date repeats over time.
//! Derivation is pure: [`RecurrenceRule::next_occurrence`] computes the next
//! due instant from the current one, and [`RecurrenceRule::describe`]
//! renders the deterministic human label shown next to a task.
//!
//! Recurrence expansion is local-only -- a repeating task is never expressed
//! as a recurring event in the external calendar; each occurrence is synced
//! as its own one-shot event.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Weekday abbreviations in natural week order (0=Sun .. 6=Sat).
const DAY_ABBREV: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How a task repeats.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    /// Task does not repeat
    None,
    /// Every `interval` days
    Daily,
    /// Every `interval` weeks
    Weekly,
    /// Every `interval` months, clamped to the last valid day
    Monthly,
    /// On specific weekdays, every week
    Custom,
}

impl Default for RecurrenceType {
    fn default() -> Self {
        RecurrenceType::None
    }
}

/// Declarative description of how a task's due date repeats.
///
/// `interval` is meaningful only for daily/weekly/monthly rules;
/// `days_of_week` only for custom rules (0=Sun .. 6=Sat, matching the
/// weekday encoding used for fixed events).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub kind: RecurrenceType,
    #[serde(default = "default_interval")]
    pub interval: u32,
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

fn default_interval() -> u32 {
    1
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::never()
    }
}

impl RecurrenceRule {
    /// The non-repeating rule.
    pub fn never() -> Self {
        Self {
            kind: RecurrenceType::None,
            interval: 1,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    /// Repeat every `interval` days.
    pub fn daily(interval: u32) -> Self {
        Self {
            kind: RecurrenceType::Daily,
            interval,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    /// Repeat every `interval` weeks.
    pub fn weekly(interval: u32) -> Self {
        Self {
            kind: RecurrenceType::Weekly,
            interval,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    /// Repeat every `interval` months.
    pub fn monthly(interval: u32) -> Self {
        Self {
            kind: RecurrenceType::Monthly,
            interval,
            days_of_week: Vec::new(),
            end_date: None,
        }
    }

    /// Repeat on the given weekdays (0=Sun .. 6=Sat) every week.
    pub fn custom(days_of_week: Vec<u8>) -> Self {
        Self {
            kind: RecurrenceType::Custom,
            interval: 1,
            days_of_week,
            end_date: None,
        }
    }

    /// Stop repeating after `end_date`.
    pub fn until(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// Whether this rule repeats at all.
    pub fn is_repeating(&self) -> bool {
        self.kind != RecurrenceType::None
    }

    /// Validate the rule.
    ///
    /// Rejected synchronously at task-edit time, before any scheduling or
    /// persistence: a custom rule must select at least one valid weekday,
    /// and daily/weekly/monthly intervals must be at least 1.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.kind {
            RecurrenceType::None => Ok(()),
            RecurrenceType::Daily | RecurrenceType::Weekly | RecurrenceType::Monthly => {
                if self.interval < 1 {
                    return Err(ValidationError::InvalidInterval {
                        interval: self.interval,
                    });
                }
                Ok(())
            }
            RecurrenceType::Custom => {
                if self.days_of_week.is_empty() {
                    return Err(ValidationError::EmptyCustomDays);
                }
                if let Some(&day) = self.days_of_week.iter().find(|&&d| d > 6) {
                    return Err(ValidationError::InvalidWeekday { day });
                }
                Ok(())
            }
        }
    }

    /// Render the human label for this rule.
    ///
    /// Pure and deterministic: identical rules always produce the identical
    /// string. `interval == 1` yields the bare frequency name; custom rules
    /// list weekday abbreviations in natural week order (Sun..Sat).
    pub fn describe(&self) -> String {
        match self.kind {
            RecurrenceType::None => "Never".to_string(),
            RecurrenceType::Daily => {
                if self.interval == 1 {
                    "Daily".to_string()
                } else {
                    format!("Every {} days", self.interval)
                }
            }
            RecurrenceType::Weekly => {
                if self.interval == 1 {
                    "Weekly".to_string()
                } else {
                    format!("Every {} weeks", self.interval)
                }
            }
            RecurrenceType::Monthly => {
                if self.interval == 1 {
                    "Monthly".to_string()
                } else {
                    format!("Every {} months", self.interval)
                }
            }
            RecurrenceType::Custom => {
                if self.days_of_week.is_empty() {
                    return "Custom".to_string();
                }
                let mut days: Vec<u8> = self
                    .days_of_week
                    .iter()
                    .copied()
                    .filter(|&d| d <= 6)
                    .collect();
                days.sort_unstable();
                days.dedup();
                days.iter()
                    .map(|&d| DAY_ABBREV[d as usize])
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
    }

    /// Compute the next occurrence after `due`.
    ///
    /// Monthly addition clamps to the last valid day of the resulting month
    /// (Jan 31 + 1 month -> Feb 28/29). Custom rules advance to the next
    /// date whose weekday is selected, wrapping across weeks as needed.
    /// Returns `None` for non-repeating rules and once the candidate
    /// exceeds `end_date`. The time of day is preserved.
    pub fn next_occurrence(&self, due: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let candidate = match self.kind {
            RecurrenceType::None => return None,
            RecurrenceType::Daily => due + Duration::days(i64::from(self.interval)),
            RecurrenceType::Weekly => due + Duration::weeks(i64::from(self.interval)),
            RecurrenceType::Monthly => due.checked_add_months(Months::new(self.interval))?,
            RecurrenceType::Custom => self.next_custom_occurrence(due)?,
        };

        match self.end_date {
            Some(end) if candidate > end => None,
            _ => Some(candidate),
        }
    }

    /// Next date (strictly after `due`) whose weekday is selected.
    fn next_custom_occurrence(&self, due: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.days_of_week.is_empty() {
            return None;
        }
        // At most one full week of wrap-around.
        (1..=7)
            .map(|offset| due + Duration::days(offset))
            .find(|d| {
                let weekday = d.weekday().num_days_from_sunday() as u8;
                self.days_of_week.contains(&weekday)
            })
    }
}
