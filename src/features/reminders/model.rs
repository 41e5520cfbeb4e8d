//! # Reminder Model
//!
//! Durable reminder records and the validated time-of-day they recur at.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock time a reminder recurs at, minute precision, no date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Build a time of day, rejecting hours past 23 and minutes past 59
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(TimeOfDay)
            .ok_or_else(|| anyhow!("Invalid time of day: {hour}:{minute:02}"))
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    /// Parse `H:MM` or `HH:MM` (24-hour clock)
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Invalid time format: {s} (expected HH:MM)"))?;

        let well_formed = (1..=2).contains(&hour.len())
            && minute.len() == 2
            && hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit());
        if !well_formed {
            return Err(anyhow!("Invalid time format: {s} (expected HH:MM)"));
        }

        TimeOfDay::new(hour.parse()?, minute.parse()?)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A medication reminder as it is persisted.
///
/// The live timer handle is deliberately absent: it lives beside the
/// reminder inside the scheduler and is rebuilt on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub medication_name: String,
    pub time_of_day: TimeOfDay,
}

impl Reminder {
    /// Create a reminder with a fresh random id
    pub fn new(medication_name: &str, time_of_day: TimeOfDay) -> Result<Self> {
        let medication_name = medication_name.trim();
        if medication_name.is_empty() {
            return Err(anyhow!("Medication name is required"));
        }

        Ok(Reminder {
            id: uuid::Uuid::new_v4().to_string(),
            medication_name: medication_name.to_string(),
            time_of_day,
        })
    }
}

/// What a notifier receives when a reminder fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderAlert {
    pub reminder_id: String,
    pub medication_name: String,
    pub time_of_day: TimeOfDay,
    pub fired_at: NaiveDateTime,
}

impl ReminderAlert {
    pub fn for_reminder(reminder: &Reminder, fired_at: NaiveDateTime) -> Self {
        ReminderAlert {
            reminder_id: reminder.id.clone(),
            medication_name: reminder.medication_name.clone(),
            time_of_day: reminder.time_of_day,
            fired_at,
        }
    }

    /// Text shown on screen and read aloud
    pub fn message(&self) -> String {
        format!(
            "Time to take your medication: {} ({})",
            self.medication_name, self.time_of_day
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_parse() {
        let t: TimeOfDay = "09:00".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (9, 0));

        let t: TimeOfDay = "7:05".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (7, 5));

        let t: TimeOfDay = " 23:59 ".parse().unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 59));
    }

    #[test]
    fn test_time_of_day_rejects_invalid() {
        for input in ["", "9", "24:00", "12:60", "12:5", "ab:cd", "12:00:00", "-1:00", "123:00"] {
            assert!(input.parse::<TimeOfDay>().is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn test_time_of_day_display_is_zero_padded() {
        assert_eq!(TimeOfDay::new(8, 5).unwrap().to_string(), "08:05");
        assert_eq!(TimeOfDay::new(0, 0).unwrap().to_string(), "00:00");
    }

    #[test]
    fn test_reminder_requires_name() {
        let time = TimeOfDay::new(9, 0).unwrap();
        assert!(Reminder::new("", time).is_err());
        assert!(Reminder::new("   ", time).is_err());

        let reminder = Reminder::new("  Aspirin ", time).unwrap();
        assert_eq!(reminder.medication_name, "Aspirin");
        assert!(!reminder.id.is_empty());
    }

    #[test]
    fn test_reminder_ids_are_unique() {
        let time = TimeOfDay::new(9, 0).unwrap();
        let a = Reminder::new("Aspirin", time).unwrap();
        let b = Reminder::new("Aspirin", time).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_reminder_persisted_shape() {
        let reminder = Reminder {
            id: "r1".to_string(),
            medication_name: "Aspirin".to_string(),
            time_of_day: TimeOfDay::new(9, 0).unwrap(),
        };

        let json = serde_json::to_value(&reminder).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "r1", "medicationName": "Aspirin", "timeOfDay": "09:00"})
        );
    }

    #[test]
    fn test_reminder_rejects_bad_persisted_time() {
        let raw = r#"{"id":"r1","medicationName":"Aspirin","timeOfDay":"25:00"}"#;
        assert!(serde_json::from_str::<Reminder>(raw).is_err());
    }

    #[test]
    fn test_alert_message() {
        let reminder = Reminder::new("Vitamin D", TimeOfDay::new(21, 30).unwrap()).unwrap();
        let fired_at = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(21, 30, 0)
            .unwrap();
        let alert = ReminderAlert::for_reminder(&reminder, fired_at);
        assert_eq!(alert.reminder_id, reminder.id);
        assert_eq!(
            alert.message(),
            "Time to take your medication: Vitamin D (21:30)"
        );
    }
}
