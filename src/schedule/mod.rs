use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;

use crate::error::{BotError, Result};
use crate::state::ProfileStore;
use crate::types::{DailySchedule, Reminder};

/// Downstream delivery of a fired trigger. Implementations re-read stored
/// state at fire time and swallow their own errors; a failed delivery waits
/// for the next occurrence.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    async fn deliver_reminder(&self, user: i64, time: &str);
    async fn deliver_digest(&self, user: i64);
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TriggerKey {
    Reminder { user: i64, time: String },
    Digest { user: i64 },
}

/// Owns every scheduled trigger: an explicit `(user, time) -> abort handle`
/// map, built once at startup and shared by reference with the handlers.
///
/// Each trigger is a spawned task that sleeps until the next wall-clock HH:MM
/// (UTC) and then invokes the sink, so slow deliveries never block other due
/// triggers. Removal aborts the task; at daily granularity best-effort
/// cancellation of the next occurrence is sufficient.
pub struct ReminderRegistry {
    store: Arc<ProfileStore>,
    sink: Arc<dyn DeliverySink>,
    triggers: Mutex<HashMap<TriggerKey, AbortHandle>>,
}

impl ReminderRegistry {
    pub fn new(store: Arc<ProfileStore>, sink: Arc<dyn DeliverySink>) -> Self {
        Self {
            store,
            sink,
            triggers: Mutex::new(HashMap::new()),
        }
    }

    /// Add a reminder at `raw_time` (normalized to zero-padded HH:MM before
    /// the duplicate check). Rejects a second reminder at the same time with
    /// `Duplicate`; the stored list stays sorted ascending by time.
    pub async fn add_reminder(
        &self,
        user: i64,
        raw_time: &str,
        label: &str,
        topic: Option<String>,
    ) -> Result<Reminder> {
        let time = normalize_time(raw_time)?;
        let reminder = self
            .store
            .mutate(user, |profile| {
                if profile.reminders.iter().any(|r| r.time == time) {
                    return Err(BotError::Duplicate);
                }
                let reminder = Reminder {
                    time: time.clone(),
                    label: label.to_string(),
                    topic,
                    active: true,
                };
                profile.reminders.push(reminder.clone());
                profile.reminders.sort_by(|a, b| a.time.cmp(&b.time));
                Ok(reminder)
            })
            .await?;
        self.register(TriggerKey::Reminder {
            user,
            time: time.clone(),
        })
        .await;
        Ok(reminder)
    }

    /// Remove by 1-based position in the current sorted list. Positions shift
    /// after every removal, so callers must re-fetch the list before
    /// computing an index.
    pub async fn remove_reminder(&self, user: i64, index: usize) -> Result<bool> {
        let removed = self
            .store
            .mutate(user, |profile| {
                if index == 0 || index > profile.reminders.len() {
                    return Ok(None);
                }
                Ok(Some(profile.reminders.remove(index - 1)))
            })
            .await?;
        match removed {
            Some(reminder) => {
                self.cancel(&TriggerKey::Reminder {
                    user,
                    time: reminder.time,
                })
                .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every reminder and cancel every associated trigger.
    pub async fn clear_all(&self, user: i64) -> Result<usize> {
        let removed: Vec<Reminder> = self
            .store
            .mutate(user, |profile| Ok(std::mem::take(&mut profile.reminders)))
            .await?;
        for reminder in &removed {
            self.cancel(&TriggerKey::Reminder {
                user,
                time: reminder.time.clone(),
            })
            .await;
        }
        Ok(removed.len())
    }

    pub async fn reminders(&self, user: i64) -> Vec<Reminder> {
        self.store.get(user).await.reminders
    }

    /// Set (or move) the singleton daily digest. The sequential content index
    /// survives a time change so corpus coverage continues where it left off.
    pub async fn set_daily(&self, user: i64, raw_time: &str) -> Result<String> {
        let time = normalize_time(raw_time)?;
        self.store
            .mutate(user, |profile| {
                let index = profile
                    .daily_schedule
                    .as_ref()
                    .map(|d| d.sequential_index)
                    .unwrap_or(0);
                profile.daily_schedule = Some(DailySchedule {
                    time: time.clone(),
                    sequential_index: index,
                });
                Ok(())
            })
            .await?;
        self.register(TriggerKey::Digest { user }).await;
        Ok(time)
    }

    pub async fn cancel_daily(&self, user: i64) -> Result<bool> {
        let had = self
            .store
            .mutate(user, |profile| Ok(profile.daily_schedule.take().is_some()))
            .await?;
        if had {
            self.cancel(&TriggerKey::Digest { user }).await;
        }
        Ok(had)
    }

    pub async fn daily_time(&self, user: i64) -> Option<String> {
        self.store.get(user).await.daily_schedule.map(|d| d.time)
    }

    /// Re-register every persisted reminder and digest. Must run at startup,
    /// before the dispatcher. Idempotent: re-registering a key replaces its
    /// trigger.
    pub async fn reload(&self) -> (usize, usize) {
        let mut digests = 0;
        let mut reminders = 0;
        for (user, profile) in self.store.snapshot().await {
            if profile.daily_schedule.is_some() {
                self.register(TriggerKey::Digest { user }).await;
                digests += 1;
            }
            for reminder in &profile.reminders {
                if reminder.active {
                    self.register(TriggerKey::Reminder {
                        user,
                        time: reminder.time.clone(),
                    })
                    .await;
                    reminders += 1;
                }
            }
        }
        (digests, reminders)
    }

    /// Number of live triggers.
    pub async fn trigger_count(&self) -> usize {
        self.triggers.lock().await.len()
    }

    async fn register(&self, key: TriggerKey) {
        let store = self.store.clone();
        let sink = self.sink.clone();
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            loop {
                let time = match trigger_time(&store, &task_key).await {
                    Some(time) => time,
                    // Trigger state disappeared from the store; go dormant
                    // until cancelled.
                    None => {
                        tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                        continue;
                    }
                };
                let (hour, minute) = match split_hm(&time) {
                    Some(hm) => hm,
                    None => {
                        log::error!("Unparseable trigger time {:?}", time);
                        return;
                    }
                };
                tokio::time::sleep(until_next_occurrence(hour, minute, Utc::now())).await;
                match &task_key {
                    TriggerKey::Reminder { user, time } => {
                        sink.deliver_reminder(*user, time).await;
                    }
                    TriggerKey::Digest { user } => {
                        sink.deliver_digest(*user).await;
                    }
                }
            }
        });
        let mut triggers = self.triggers.lock().await;
        if let Some(previous) = triggers.insert(key, handle.abort_handle()) {
            previous.abort();
        }
    }

    async fn cancel(&self, key: &TriggerKey) {
        let mut triggers = self.triggers.lock().await;
        if let Some(handle) = triggers.remove(key) {
            handle.abort();
        }
    }
}

async fn trigger_time(store: &ProfileStore, key: &TriggerKey) -> Option<String> {
    match key {
        TriggerKey::Reminder { user, time } => {
            let profile = store.get(*user).await;
            profile
                .reminders
                .iter()
                .find(|r| &r.time == time && r.active)
                .map(|r| r.time.clone())
        }
        TriggerKey::Digest { user } => {
            store.get(*user).await.daily_schedule.map(|d| d.time)
        }
    }
}

/// Validate and zero-pad a clock time: `"8:30"` becomes `"08:30"`.
/// Normalization runs before any duplicate check, so `"08:30"` and `"8:30"`
/// collide as intended.
pub fn normalize_time(raw: &str) -> Result<String> {
    let invalid = || BotError::Validation(format!("bad time {raw:?}, expected HH:MM"));
    let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let hours: u32 = hours.trim().parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(format!("{hours:02}:{minutes:02}"))
}

fn split_hm(time: &str) -> Option<(u32, u32)> {
    let (h, m) = time.split_once(':')?;
    Some((h.parse().ok()?, m.parse().ok()?))
}

/// Sleep duration until the next wall-clock occurrence of `hour:minute` UTC.
/// A time at or before `now` fires tomorrow.
pub fn until_next_occurrence(hour: u32, minute: u32, now: DateTime<Utc>) -> Duration {
    let target = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
    let mut fire = now.date_naive().and_time(target).and_utc();
    if fire <= now {
        fire += chrono::Duration::days(1);
    }
    (fire - now).to_std().unwrap_or(Duration::from_secs(60))
}
