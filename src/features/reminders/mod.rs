//! # Reminders Feature
//!
//! Daily medication reminders with per-user persistence.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod model;
pub mod occurrence;
pub mod scheduler;
pub mod store;

pub use model::{Reminder, ReminderAlert, TimeOfDay};
pub use occurrence::{next_occurrence, Clock, ManualClock, SystemClock};
pub use scheduler::{ReminderScheduler, SchedulerOptions};
pub use store::{InMemoryStore, ReminderStore};
