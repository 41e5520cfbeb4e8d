//! # Core Module
//!
//! Configuration and session context shared by every feature.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod config;
pub mod session;

// Re-export commonly used items
pub use config::Config;
pub use session::Session;
