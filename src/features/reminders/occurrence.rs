//! # Occurrence Calculation
//!
//! Maps a daily time of day onto the next concrete wall-clock instant,
//! and abstracts the wall clock so scheduling can be driven in tests.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::reminders::model::TimeOfDay;
use chrono::{Local, NaiveDateTime};
use std::sync::Mutex;
use std::time::Duration;

/// Source of the current local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The real local clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Next instant `time` elapses: today if still strictly ahead of `now`,
/// otherwise tomorrow.
pub fn next_occurrence(now: NaiveDateTime, time: TimeOfDay) -> NaiveDateTime {
    let today = now.date().and_time(time.as_naive_time());
    if today > now {
        today
    } else {
        today + chrono::Duration::days(1)
    }
}

/// How long to sleep from `now` until `target`; zero if already past
pub fn delay_until(now: NaiveDateTime, target: NaiveDateTime) -> Duration {
    (target - now).to_std().unwrap_or(Duration::ZERO)
}
