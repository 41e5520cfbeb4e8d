//! # Configuration
//!
//! Environment-driven settings for the reminder service. `.env` files are
//! honoured by the binary through `dotenvy` before `Config::from_env` runs.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use std::env;

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity of the logged-in user; reminders are namespaced by it
    pub user_id: String,
    /// Path of the SQLite database holding persisted reminders
    pub database_path: String,
    /// Default `env_logger` filter
    pub log_level: String,
    /// Re-arm each reminder for the following day after it fires
    pub rearm_daily: bool,
    /// Path of the YAML notification config
    pub notify_config_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let user_id = env::var("REMINDER_USER")
            .or_else(|_| env::var("USER"))
            .map_err(|_| anyhow!("REMINDER_USER must be set (or USER available)"))?;
        let user_id = user_id.trim().to_string();
        if user_id.is_empty() {
            return Err(anyhow!("REMINDER_USER must not be empty"));
        }

        let rearm_daily = match env::var("REMINDER_REARM_DAILY") {
            Ok(raw) => parse_bool(&raw)
                .ok_or_else(|| anyhow!("Invalid REMINDER_REARM_DAILY value: {raw}"))?,
            Err(_) => true,
        };

        Ok(Config {
            user_id,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "reminders.db".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rearm_daily,
            notify_config_path: env::var("NOTIFY_CONFIG_PATH")
                .unwrap_or_else(|_| "notify.yaml".to_string()),
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
