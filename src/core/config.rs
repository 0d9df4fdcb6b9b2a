//! # Configuration
//!
//! Environment-driven settings for the reminder bot.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use anyhow::{Context, Result};
use std::time::Duration;

use super::replies::Language;

/// Cadence of the delivery sweep. Fixed, not read from the environment.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound for a single chat send during a sweep.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub database_path: String,
    pub log_level: String,
    pub language: Language,
    /// Also deliver reminders whose minute has already passed
    pub deliver_overdue: bool,
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// Call `dotenvy::dotenv()` beforehand to pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .context("DISCORD_TOKEN environment variable is required")?;

        Self::from_lookup(discord_token, |key| std::env::var(key).ok())
    }

    fn from_lookup<F>(discord_token: String, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path =
            lookup("DATABASE_PATH").unwrap_or_else(|| "reminders.db".to_string());
        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let language = match lookup("BOT_LANGUAGE") {
            Some(value) => value.parse::<Language>()?,
            None => Language::default(),
        };

        let deliver_overdue = match lookup("DELIVER_OVERDUE") {
            Some(value) => parse_flag(&value)
                .ok_or_else(|| anyhow::anyhow!("Invalid DELIVER_OVERDUE value: {}", value))?,
            None => true,
        };

        Ok(Config {
            discord_token,
            database_path,
            log_level,
            language,
            deliver_overdue,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
