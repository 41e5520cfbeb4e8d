//! # Commands
//!
//! Line-oriented console commands for managing reminders.

pub mod console;

pub use console::{parse_command, resolve_id, Command};
