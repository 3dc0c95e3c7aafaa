//! Configuration commands.

use clap::Subcommand;
use taskmaster_core::{ReminderLead, Settings};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show all settings
    Show,
    /// Set a config value
    Set {
        /// Config key (e.g. "sync.enabled", "sync.reminder_lead_minutes")
        key: String,
        /// New value
        value: String,
    },
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;
            let json = serde_json::to_string_pretty(&settings)?;
            println!("{json}");
        }
        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load()?;
            apply(&mut settings, &key, &value)?;
            settings.save()?;
            println!("ok");
        }
        ConfigAction::Reset => {
            Settings::default().save()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

fn apply(settings: &mut Settings, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        "sync.enabled" => settings.sync.enabled = value.parse()?,
        "sync.reminder_lead_minutes" => {
            let minutes: u32 = value.parse()?;
            // Reject values outside the enumerated set up front.
            ReminderLead::try_from(minutes)?;
            settings.sync.reminder_lead_minutes = minutes;
        }
        "sync.debounce_ms" => settings.sync.debounce_ms = value.parse()?,
        "sync.call_timeout_secs" => settings.sync.call_timeout_secs = value.parse()?,
        "notifications.enabled" => settings.notifications.enabled = value.parse()?,
        other => return Err(format!("unknown key: {other}").into()),
    }
    Ok(())
}
