//! # Notification Configuration
//!
//! YAML configuration for how fired reminders are surfaced.
//!
//! ```yaml
//! console: true
//! speech:
//!   enabled: true
//!   command: espeak
//!   args: ["-s", "150", "{message}"]
//!   timeout_seconds: 15
//! ```
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Root notification configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// Print alerts to the terminal
    #[serde(default = "default_true")]
    pub console: bool,

    /// Spoken announcements through an external TTS command
    #[serde(default)]
    pub speech: Option<SpeechConfig>,
}

/// External text-to-speech command
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Executable to run, e.g. `espeak` or `say`
    pub command: String,

    /// Arguments; `{message}` is replaced by the alert text, which is
    /// appended as the last argument when no placeholder is present
    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    15
}

impl Default for NotifyConfig {
    fn default() -> Self {
        NotifyConfig {
            console: true,
            speech: None,
        }
    }
}

impl NotifyConfig {
    /// Load notification configuration from a YAML file
    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: NotifyConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(speech) = &self.speech {
            if speech.enabled && speech.command.trim().is_empty() {
                return Err(anyhow!("Speech is enabled but no command is configured"));
            }
            if speech.timeout_seconds == 0 {
                return Err(anyhow!("Speech timeout must be at least one second"));
            }
        }
        Ok(())
    }
}
