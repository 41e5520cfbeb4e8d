// Core layer - configuration and session context
pub mod core;

// Features layer - reminders and notifications
pub mod features;

// Infrastructure
pub mod database;

// Application layer
pub mod commands;

pub use core::{Config, Session};
pub use database::Database;
pub use features::notifications::{NotifierSet, NotifyConfig};
pub use features::reminders::{
    Reminder, ReminderAlert, ReminderScheduler, ReminderStore, SchedulerOptions, TimeOfDay,
};
