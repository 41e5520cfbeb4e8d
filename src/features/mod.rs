//! # Features
//!
//! - `reminders`: the reminder scheduler and its storage
//! - `notifications`: how fired reminders reach the user

pub mod notifications;
pub mod reminders;
