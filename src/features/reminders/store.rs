//! # Reminder Storage
//!
//! Durable per-user reminder lists. Each user owns exactly one record
//! holding their full list; saves replace it wholesale.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::reminders::model::Reminder;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

/// Persistence backend for reminders, keyed by user id
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Load a user's reminders; an unknown user has none
    async fn load(&self, user_id: &str) -> Result<Vec<Reminder>>;

    /// Replace a user's stored reminders with `reminders`
    async fn save(&self, user_id: &str, reminders: &[Reminder]) -> Result<()>;
}

/// Process-local store, used when no database is available and in tests
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<String, Vec<Reminder>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReminderStore for InMemoryStore {
    async fn load(&self, user_id: &str) -> Result<Vec<Reminder>> {
        Ok(self
            .records
            .get(user_id)
            .map(|r| r.clone())
            .unwrap_or_default())
    }

    async fn save(&self, user_id: &str, reminders: &[Reminder]) -> Result<()> {
        self.records.insert(user_id.to_string(), reminders.to_vec());
        Ok(())
    }
}
