//! # Database
//!
//! SQLite persistence for reminder lists. One row per user; the row holds
//! the user's reminders as a JSON array of `{id, medicationName, timeOfDay}`.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::reminders::{Reminder, ReminderStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use sqlite::{Connection, State};
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS user_reminders (
        user_id TEXT PRIMARY KEY,
        reminders TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database at `path`; `:memory:` is accepted
    pub async fn new(path: &str) -> Result<Self> {
        let connection =
            sqlite::open(path).with_context(|| format!("Failed to open database at {path}"))?;
        connection
            .execute(SCHEMA)
            .context("Failed to initialise reminder schema")?;

        info!("Opened reminder database at {path}");

        Ok(Database {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Raw JSON record for a user, if one exists
    pub async fn get_reminder_record(&self, user_id: &str) -> Result<Option<String>> {
        let connection = self.connection.lock().await;
        read_record(&connection, user_id)
    }

    /// Replace the JSON record for a user
    pub async fn put_reminder_record(&self, user_id: &str, record: &str) -> Result<()> {
        let connection = self.connection.lock().await;
        write_record(&connection, user_id, record)
    }
}

fn read_record(connection: &Connection, user_id: &str) -> Result<Option<String>> {
    let mut statement =
        connection.prepare("SELECT reminders FROM user_reminders WHERE user_id = ?")?;
    statement.bind((1, user_id))?;

    if let State::Row = statement.next()? {
        Ok(Some(statement.read::<String, _>("reminders")?))
    } else {
        Ok(None)
    }
}

fn write_record(connection: &Connection, user_id: &str, record: &str) -> Result<()> {
    let updated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let mut statement = connection.prepare(
        "INSERT OR REPLACE INTO user_reminders (user_id, reminders, updated_at) VALUES (?, ?, ?)",
    )?;
    statement.bind((1, user_id))?;
    statement.bind((2, record))?;
    statement.bind((3, updated_at.as_str()))?;
    while statement.next()? != State::Done {}

    Ok(())
}

#[async_trait]
impl ReminderStore for Database {
    async fn load(&self, user_id: &str) -> Result<Vec<Reminder>> {
        match self.get_reminder_record(user_id).await? {
            Some(record) => {
                let entries: Vec<serde_json::Value> = serde_json::from_str(&record)
                    .with_context(|| format!("Corrupt reminder record for user {user_id}"))?;

                let mut reminders = Vec::with_capacity(entries.len());
                for entry in entries {
                    match serde_json::from_value::<Reminder>(entry.clone()) {
                        Ok(reminder) => reminders.push(reminder),
                        Err(e) => warn!("Skipping unreadable reminder for user {user_id}: {e} ({entry})"),
                    }
                }

                debug!("Loaded {} reminders for user {user_id}", reminders.len());
                Ok(reminders)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, user_id: &str, reminders: &[Reminder]) -> Result<()> {
        let record = serde_json::to_string(reminders)?;
        self.put_reminder_record(user_id, &record).await?;
        debug!("Saved {} reminders for user {user_id}", reminders.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::TimeOfDay;

    async fn memory_db() -> Database {
        Database::new(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_reminders() {
        let db = memory_db().await;
        assert!(db.load("nobody").await.unwrap().is_empty());
        assert_eq!(db.get_reminder_record("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_preserves_reminders() {
        let db = memory_db().await;
        let reminders = vec![
            Reminder::new("Aspirin", TimeOfDay::new(9, 0).unwrap()).unwrap(),
            Reminder::new("Vitamin D", TimeOfDay::new(21, 30).unwrap()).unwrap(),
        ];

        db.save("alice", &reminders).await.unwrap();

        assert_eq!(db.load("alice").await.unwrap(), reminders);
    }

    #[tokio::test]
    async fn test_one_record_per_user() {
        let db = memory_db().await;
        let nine = TimeOfDay::new(9, 0).unwrap();
        let aspirin = Reminder::new("Aspirin", nine).unwrap();
        let insulin = Reminder::new("Insulin", nine).unwrap();

        db.save("alice", &[aspirin.clone(), insulin.clone()]).await.unwrap();
        db.save("alice", &[insulin.clone()]).await.unwrap();
        db.save("bob", &[aspirin.clone()]).await.unwrap();

        assert_eq!(db.load("alice").await.unwrap(), vec![insulin]);
        assert_eq!(db.load("bob").await.unwrap(), vec![aspirin]);
    }

    #[tokio::test]
    async fn test_record_layout_excludes_handles() {
        let db = memory_db().await;
        let reminder = Reminder {
            id: "r1".to_string(),
            medication_name: "Aspirin".to_string(),
            time_of_day: TimeOfDay::new(9, 0).unwrap(),
        };

        db.save("alice", &[reminder]).await.unwrap();

        let record = db.get_reminder_record("alice").await.unwrap().unwrap();
        assert_eq!(
            record,
            r#"[{"id":"r1","medicationName":"Aspirin","timeOfDay":"09:00"}]"#
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let db = memory_db().await;
        db.put_reminder_record("alice", "not json").await.unwrap();
        assert!(db.load("alice").await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_entry_is_skipped() {
        let db = memory_db().await;
        db.put_reminder_record(
            "alice",
            r#"[{"id":"keep","medicationName":"Insulin","timeOfDay":"08:00"},{"id":"bad","medicationName":"Aspirin","timeOfDay":"25:00"}]"#,
        )
        .await
        .unwrap();

        let loaded = db.load("alice").await.unwrap();
        assert_eq!(
            loaded,
            vec![Reminder {
                id: "keep".to_string(),
                medication_name: "Insulin".to_string(),
                time_of_day: TimeOfDay::new(8, 0).unwrap(),
            }]
        );
    }
}
