//! Recurrence rule inspection commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use taskmaster_core::{RecurrenceRule, RecurrenceType};

#[derive(Args)]
pub struct RuleSpec {
    /// Rule kind: none, daily, weekly, monthly, custom
    #[arg(long, default_value = "none")]
    kind: String,
    /// Interval for daily/weekly/monthly rules
    #[arg(long, default_value = "1")]
    interval: u32,
    /// Comma-separated weekdays for custom rules, 0=Sun .. 6=Sat (e.g. "1,3,5")
    #[arg(long)]
    days: Option<String>,
    /// Stop repeating after this instant (RFC 3339)
    #[arg(long)]
    end_date: Option<DateTime<Utc>>,
}

impl RuleSpec {
    fn build(&self) -> Result<RecurrenceRule, Box<dyn std::error::Error>> {
        let kind = match self.kind.to_lowercase().as_str() {
            "none" => RecurrenceType::None,
            "daily" => RecurrenceType::Daily,
            "weekly" => RecurrenceType::Weekly,
            "monthly" => RecurrenceType::Monthly,
            "custom" => RecurrenceType::Custom,
            other => return Err(format!("unknown rule kind: {other}").into()),
        };

        let days_of_week = match &self.days {
            Some(days) => days
                .split(',')
                .map(|d| d.trim().parse::<u8>())
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let rule = RecurrenceRule {
            kind,
            interval: self.interval,
            days_of_week,
            end_date: self.end_date,
        };
        rule.validate()?;
        Ok(rule)
    }
}

#[derive(Subcommand)]
pub enum RuleAction {
    /// Print the human label for a rule
    Describe {
        #[command(flatten)]
        spec: RuleSpec,
    },
    /// Print the next occurrence(s) after a due date
    Next {
        #[command(flatten)]
        spec: RuleSpec,
        /// Current due date (RFC 3339)
        #[arg(long)]
        due: DateTime<Utc>,
        /// How many occurrences to print
        #[arg(long, default_value = "1")]
        count: usize,
    },
}

pub fn run(action: RuleAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RuleAction::Describe { spec } => {
            let rule = spec.build()?;
            println!("{}", rule.describe());
        }
        RuleAction::Next { spec, due, count } => {
            let rule = spec.build()?;
            let mut current = due;
            for _ in 0..count {
                match rule.next_occurrence(current) {
                    Some(next) => {
                        println!("{}", next.to_rfc3339());
                        current = next;
                    }
                    None => {
                        println!("(no further occurrences)");
                        break;
                    }
                }
            }
        }
    }
    Ok(())
}
