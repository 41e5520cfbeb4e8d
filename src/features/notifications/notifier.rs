//! # Notifiers
//!
//! Surfaces fired reminders to the user: a console banner for the visual
//! alert and an external text-to-speech command for the spoken one.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::notifications::config::{NotifyConfig, SpeechConfig};
use crate::features::reminders::ReminderAlert;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Placeholder in speech arguments replaced by the alert text
const MESSAGE_PLACEHOLDER: &str = "{message}";

/// Something that can tell the user a reminder fired
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &ReminderAlert) -> Result<()>;
}

/// Prints a banner to stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn render(alert: &ReminderAlert) -> String {
        format!(
            "\n⏰ {}\n   reminder {} fired at {}\n",
            alert.message(),
            alert.reminder_id,
            alert.fired_at.format("%Y-%m-%d %H:%M")
        )
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, alert: &ReminderAlert) -> Result<()> {
        println!("{}", Self::render(alert));
        Ok(())
    }
}

/// Reads the alert aloud through an external TTS command.
///
/// The command runs without a shell, so the medication name is passed
/// through as a single argument and never interpreted.
#[derive(Debug, Clone)]
pub struct SpeechNotifier {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SpeechNotifier {
    pub fn new(config: &SpeechConfig) -> Self {
        SpeechNotifier {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    /// Arguments for announcing `message`
    pub fn build_args(&self, message: &str) -> Vec<String> {
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains(MESSAGE_PLACEHOLDER) {
                    substituted = true;
                    arg.replace(MESSAGE_PLACEHOLDER, message)
                } else {
                    arg.clone()
                }
            })
            .collect();

        if !substituted {
            args.push(message.to_string());
        }
        args
    }
}

#[async_trait]
impl Notifier for SpeechNotifier {
    async fn notify(&self, alert: &ReminderAlert) -> Result<()> {
        let args = self.build_args(&alert.message());
        debug!("Announcing reminder {} via {}", alert.reminder_id, self.command);

        let mut cmd = Command::new(&self.command);
        cmd.args(&args)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => Err(anyhow!(
                "{} exited with {:?}: {}",
                self.command,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )),
            Ok(Err(e)) => Err(anyhow!("Failed to run {}: {}", self.command, e)),
            Err(_) => Err(anyhow!(
                "{} timed out after {}s",
                self.command,
                self.timeout.as_secs()
            )),
        }
    }
}

/// Fans an alert out to every configured notifier.
///
/// Delivery is best effort: individual failures are logged and the alert
/// still counts as delivered.
#[derive(Clone, Default)]
pub struct NotifierSet {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    pub fn from_config(config: &NotifyConfig) -> Self {
        let mut set = NotifierSet::new();
        if config.console {
            set = set.with(Arc::new(ConsoleNotifier));
        }
        if let Some(speech) = config.speech.as_ref().filter(|s| s.enabled) {
            info!("🔊 Spoken reminders enabled via {}", speech.command);
            set = set.with(Arc::new(SpeechNotifier::new(speech)));
        }
        set
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

#[async_trait]
impl Notifier for NotifierSet {
    async fn notify(&self, alert: &ReminderAlert) -> Result<()> {
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(alert).await {
                warn!(
                    "Failed to deliver reminder {} ({}): {e}",
                    alert.reminder_id, alert.medication_name
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::{Reminder, TimeOfDay};
    use std::sync::Mutex;

    fn test_alert() -> ReminderAlert {
        let reminder = Reminder::new("Aspirin", TimeOfDay::new(9, 0).unwrap()).unwrap();
        let fired_at = chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        ReminderAlert::for_reminder(&reminder, fired_at)
    }

    fn speech(command: &str, args: &[&str], timeout_seconds: u64) -> SpeechNotifier {
        SpeechNotifier::new(&SpeechConfig {
            enabled: true,
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            timeout_seconds,
        })
    }

    struct Failing;

    #[async_trait]
    impl Notifier for Failing {
        async fn notify(&self, _alert: &ReminderAlert) -> Result<()> {
            Err(anyhow!("speaker unplugged"))
        }
    }

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Notifier for Recording {
        async fn notify(&self, alert: &ReminderAlert) -> Result<()> {
            self.seen.lock().unwrap().push(alert.medication_name.clone());
            Ok(())
        }
    }

    #[test]
    fn test_console_render() {
        let rendered = ConsoleNotifier::render(&test_alert());
        assert!(rendered.contains("Time to take your medication: Aspirin (09:00)"));
        assert!(rendered.contains("2024-03-10 09:00"));
    }

    #[test]
    fn test_build_args_substitutes_placeholder() {
        let notifier = speech("espeak", &["-s", "150", "Say: {message}"], 5);
        assert_eq!(
            notifier.build_args("take Aspirin"),
            vec!["-s", "150", "Say: take Aspirin"]
        );
    }

    #[test]
    fn test_build_args_appends_without_placeholder() {
        let notifier = speech("say", &["-v", "Samantha"], 5);
        assert_eq!(
            notifier.build_args("take Aspirin"),
            vec!["-v", "Samantha", "take Aspirin"]
        );
    }

    #[test]
    fn test_build_args_keeps_shell_characters_literal() {
        let notifier = speech("say", &[], 5);
        assert_eq!(notifier.build_args("a; rm -rf /"), vec!["a; rm -rf /"]);
    }

    #[tokio::test]
    async fn test_speech_runs_command() {
        let notifier = speech("echo", &["{message}"], 10);
        assert!(notifier.notify(&test_alert()).await.is_ok());
    }

    #[tokio::test]
    async fn test_speech_reports_failure() {
        let notifier = speech("false", &[], 10);
        assert!(notifier.notify(&test_alert()).await.is_err());

        let missing = speech("definitely-not-a-tts-binary", &[], 10);
        assert!(missing.notify(&test_alert()).await.is_err());
    }

    #[tokio::test]
    async fn test_speech_times_out() {
        let notifier = speech("sleep", &["5"], 1);
        let err = notifier.notify(&test_alert()).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_set_swallows_failures_and_continues() {
        let recording = Arc::new(Recording::default());
        let set = NotifierSet::new()
            .with(Arc::new(Failing))
            .with(recording.clone());

        assert!(set.notify(&test_alert()).await.is_ok());
        assert_eq!(*recording.seen.lock().unwrap(), vec!["Aspirin".to_string()]);
    }

    #[test]
    fn test_set_from_config() {
        assert_eq!(NotifierSet::from_config(&NotifyConfig::default()).len(), 1);

        let config = NotifyConfig {
            console: false,
            speech: Some(SpeechConfig {
                enabled: false,
                command: "say".to_string(),
                args: vec![],
                timeout_seconds: 5,
            }),
        };
        assert!(NotifierSet::from_config(&config).is_empty());

        let config = NotifyConfig {
            console: true,
            speech: Some(SpeechConfig {
                enabled: true,
                command: "say".to_string(),
                args: vec![],
                timeout_seconds: 5,
            }),
        };
        assert_eq!(NotifierSet::from_config(&config).len(), 2);
    }
}
