//! # Reminder Scheduler
//!
//! Owns the session user's medication reminders and keeps exactly one timer
//! task armed per reminder. Timers are never persisted: they are rebuilt from
//! each reminder's time of day whenever reminders are loaded.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::Session;
use crate::features::notifications::Notifier;
use crate::features::reminders::model::{Reminder, ReminderAlert, TimeOfDay};
use crate::features::reminders::occurrence::{delay_until, next_occurrence, Clock};
use crate::features::reminders::store::ReminderStore;
use anyhow::Result;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Longest single sleep of a timer task. The wall clock is re-read after
/// each chunk so suspend and clock changes cannot push a reminder off its time.
const MAX_SLEEP_CHUNK: Duration = Duration::from_secs(60);

/// Armed occurrence shared between an entry and its timer task
type NextFire = Arc<StdMutex<Option<NaiveDateTime>>>;

/// Scheduler behaviour switches
#[derive(Debug, Clone, Copy)]
pub struct SchedulerOptions {
    /// After firing, arm the same reminder again for the next day
    pub rearm_daily: bool,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        SchedulerOptions { rearm_daily: true }
    }
}

/// A reminder together with its live timer
struct ScheduledReminder {
    reminder: Reminder,
    /// Insertion order, used to keep the persisted list append-ordered
    position: u64,
    /// Armed occurrence; `None` once a one-shot timer has fired
    next_fire: NextFire,
    handle: JoinHandle<()>,
}

impl ScheduledReminder {
    fn next_fire(&self) -> Option<NaiveDateTime> {
        *self.next_fire.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// What a timer task needs, without borrowing the scheduler
struct TimerContext {
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    rearm_daily: bool,
    next_fire: NextFire,
}

pub struct ReminderScheduler {
    session: Session,
    store: Arc<dyn ReminderStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    options: SchedulerOptions,
    reminders: Arc<DashMap<String, ScheduledReminder>>,
    counter: AtomicU64,
    /// Cleared when loading fails; the stored record is then never overwritten
    durable: AtomicBool,
    /// Serialises snapshot + save so concurrent mutations cannot lose writes
    persist_lock: Mutex<()>,
}

impl ReminderScheduler {
    pub fn new(
        session: Session,
        store: Arc<dyn ReminderStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        options: SchedulerOptions,
    ) -> Self {
        ReminderScheduler {
            session,
            store,
            notifier,
            clock,
            options,
            reminders: Arc::new(DashMap::new()),
            counter: AtomicU64::new(0),
            durable: AtomicBool::new(true),
            persist_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Create a reminder, arm its timer and persist it.
    ///
    /// Fails only on validation (blank name); storage failures are logged
    /// and the reminder stays active in memory.
    pub async fn add_reminder(&self, medication_name: &str, time: TimeOfDay) -> Result<Reminder> {
        let reminder = Reminder::new(medication_name, time)?;
        let position = self.next_counter();
        let next_fire = self.arm(reminder.clone(), position);

        info!(
            "Added reminder {} ({} at {}) for user {}, next at {}",
            reminder.id, reminder.medication_name, reminder.time_of_day, self.session.user_id, next_fire
        );

        self.persist().await;
        Ok(reminder)
    }

    /// Cancel and forget a reminder. Returns whether it existed; unknown ids
    /// change nothing.
    pub async fn remove_reminder(&self, id: &str) -> bool {
        match self.reminders.remove(id) {
            Some((_, scheduled)) => {
                scheduled.handle.abort();
                info!(
                    "Removed reminder {id} ({}) for user {}",
                    scheduled.reminder.medication_name, self.session.user_id
                );
                self.persist().await;
                true
            }
            None => {
                debug!("No reminder {id} for user {}; nothing removed", self.session.user_id);
                false
            }
        }
    }

    /// Load the session user's persisted reminders and arm a fresh timer for
    /// each, relative to the current time.
    pub async fn load_reminders(&self) -> Vec<Reminder> {
        let stored = match self.store.load(&self.session.user_id).await {
            Ok(reminders) => reminders,
            Err(e) => {
                self.durable.store(false, Ordering::SeqCst);
                warn!(
                    "Failed to load reminders for user {}: {e}. Continuing in memory only",
                    self.session.user_id
                );
                return Vec::new();
            }
        };

        for reminder in &stored {
            let position = self.next_counter();
            self.arm(reminder.clone(), position);
        }

        info!(
            "Loaded {} reminders for user {}",
            stored.len(),
            self.session.user_id
        );
        stored
    }

    /// Current reminders ordered by time of day, then name
    pub fn list_reminders(&self) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> =
            self.reminders.iter().map(|e| e.reminder.clone()).collect();
        reminders.sort_by(|a, b| {
            a.time_of_day
                .cmp(&b.time_of_day)
                .then_with(|| a.medication_name.cmp(&b.medication_name))
        });
        reminders
    }

    /// Armed occurrence of a reminder, if its timer is still pending
    pub fn next_fire(&self, id: &str) -> Option<NaiveDateTime> {
        self.reminders
            .get(id)
            .filter(|e| !e.handle.is_finished())
            .and_then(|e| e.next_fire())
    }

    /// Whether changes are being written to the store this session
    pub fn is_durable(&self) -> bool {
        self.durable.load(Ordering::SeqCst)
    }

    /// Pending reminders ordered by when they fire next
    pub fn upcoming(&self) -> Vec<(Reminder, NaiveDateTime)> {
        let mut upcoming: Vec<(Reminder, NaiveDateTime)> = self
            .reminders
            .iter()
            .filter(|e| !e.handle.is_finished())
            .filter_map(|e| e.next_fire().map(|at| (e.reminder.clone(), at)))
            .collect();
        upcoming.sort_by(|a, b| a.1.cmp(&b.1));
        upcoming
    }

    /// Number of timer tasks that have not finished
    pub fn pending_timers(&self) -> usize {
        self.reminders
            .iter()
            .filter(|e| !e.handle.is_finished())
            .count()
    }

    /// End the session: cancel every timer and drop the in-memory reminders.
    /// Persisted reminders are untouched.
    pub fn shutdown(&self) {
        for entry in self.reminders.iter() {
            entry.handle.abort();
        }
        self.reminders.clear();
        info!("Reminder scheduler for user {} shut down", self.session.user_id);
    }

    fn next_counter(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Spawn the timer for `reminder`, replacing any timer already armed for
    /// the same id. Returns the armed occurrence.
    fn arm(&self, reminder: Reminder, position: u64) -> NaiveDateTime {
        let next_fire = next_occurrence(self.clock.now(), reminder.time_of_day);
        // Shared before the task starts, so its updates can never be lost
        let shared: NextFire = Arc::new(StdMutex::new(Some(next_fire)));

        let ctx = TimerContext {
            notifier: self.notifier.clone(),
            clock: self.clock.clone(),
            rearm_daily: self.options.rearm_daily,
            next_fire: shared.clone(),
        };
        let handle = tokio::spawn(run_timer(ctx, reminder.clone(), next_fire));

        debug!("Armed reminder {} for {next_fire}", reminder.id);

        let id = reminder.id.clone();
        let previous = self.reminders.insert(
            id,
            ScheduledReminder {
                reminder,
                position,
                next_fire: shared,
                handle,
            },
        );
        if let Some(previous) = previous {
            previous.handle.abort();
        }

        next_fire
    }

    /// Write the full list, in insertion order, to the store
    async fn persist(&self) {
        if !self.is_durable() {
            warn!(
                "Not saving reminders for user {}: stored reminders could not be loaded this session",
                self.session.user_id
            );
            return;
        }

        let _guard = self.persist_lock.lock().await;

        let mut entries: Vec<(u64, Reminder)> = self
            .reminders
            .iter()
            .map(|e| (e.position, e.reminder.clone()))
            .collect();
        entries.sort_by_key(|(position, _)| *position);
        let reminders: Vec<Reminder> = entries.into_iter().map(|(_, r)| r).collect();

        if let Err(e) = self.store.save(&self.session.user_id, &reminders).await {
            error!(
                "Failed to persist reminders for user {}: {e}. Changes kept in memory only",
                self.session.user_id
            );
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for entry in self.reminders.iter() {
            entry.handle.abort();
        }
    }
}

async fn run_timer(ctx: TimerContext, reminder: Reminder, mut next_fire: NaiveDateTime) {
    loop {
        wait_until(ctx.clock.as_ref(), next_fire).await;
        on_fire(ctx.notifier.as_ref(), &reminder, ctx.clock.now()).await;

        if !ctx.rearm_daily {
            set_next_fire(&ctx, None);
            debug!("Reminder {} fired once and will not re-arm", reminder.id);
            return;
        }

        next_fire = next_occurrence(ctx.clock.now().max(next_fire), reminder.time_of_day);
        set_next_fire(&ctx, Some(next_fire));
        debug!("Re-armed reminder {} for {next_fire}", reminder.id);
    }
}

/// Sleep until the wall clock reaches `target`, in chunks of at most
/// `MAX_SLEEP_CHUNK`
async fn wait_until(clock: &dyn Clock, target: NaiveDateTime) {
    loop {
        let now = clock.now();
        if now >= target {
            return;
        }
        tokio::time::sleep(delay_until(now, target).min(MAX_SLEEP_CHUNK)).await;
    }
}

fn set_next_fire(ctx: &TimerContext, next_fire: Option<NaiveDateTime>) {
    *ctx.next_fire.lock().unwrap_or_else(|e| e.into_inner()) = next_fire;
}

async fn on_fire(notifier: &dyn Notifier, reminder: &Reminder, fired_at: NaiveDateTime) {
    info!(
        "🔔 Reminder {} fired: {} ({})",
        reminder.id, reminder.medication_name, reminder.time_of_day
    );
    let alert = ReminderAlert::for_reminder(reminder, fired_at);
    if let Err(e) = notifier.notify(&alert).await {
        warn!("Failed to deliver reminder {}: {e}", reminder.id);
    }
}
