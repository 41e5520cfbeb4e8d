//! # Notifications Feature
//!
//! Visual and spoken delivery of fired reminders.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true

pub mod config;
pub mod notifier;

pub use config::{NotifyConfig, SpeechConfig};
pub use notifier::{ConsoleNotifier, Notifier, NotifierSet, SpeechNotifier};
