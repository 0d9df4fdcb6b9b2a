//! # Reminder Store
//!
//! Durable collection of pending reminders, keyed by identity and
//! queryable by due minute. Every operation is atomic on its own; callers
//! serialize anything that spans several operations.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use super::model::{truncate_to_minute, Reminder, ReminderId};
use crate::database::Database;

#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Persist `reminder`, assigning an identity if it has none.
    /// Returns the stored reminder.
    async fn save(&self, reminder: Reminder) -> Result<Reminder>;

    /// Reminders whose due minute equals `instant`'s minute. Order is unspecified.
    async fn find_due(&self, instant: NaiveDateTime) -> Result<Vec<Reminder>>;

    /// Reminders due strictly before `instant`'s minute, oldest first
    async fn find_overdue(&self, instant: NaiveDateTime) -> Result<Vec<Reminder>>;

    /// Remove `reminder` by identity. Absent or unsaved reminders are a no-op.
    async fn delete(&self, reminder: &Reminder) -> Result<()>;

    /// Number of pending reminders
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
impl ReminderStore for Database {
    async fn save(&self, reminder: Reminder) -> Result<Reminder> {
        match reminder.id() {
            Some(id) => {
                self.upsert_reminder(id, &reminder).await?;
                Ok(reminder)
            }
            None => {
                let id = self.insert_reminder(&reminder).await?;
                Ok(reminder.with_id(id))
            }
        }
    }

    async fn find_due(&self, instant: NaiveDateTime) -> Result<Vec<Reminder>> {
        self.get_reminders_at(truncate_to_minute(instant)).await
    }

    async fn find_overdue(&self, instant: NaiveDateTime) -> Result<Vec<Reminder>> {
        self.get_reminders_before(truncate_to_minute(instant)).await
    }

    async fn delete(&self, reminder: &Reminder) -> Result<()> {
        if let Some(id) = reminder.id() {
            self.delete_reminder(id).await?;
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        self.count_reminders().await
    }
}

/// Process-local store, used in tests and when no database is wanted
#[derive(Debug, Default)]
pub struct MemoryReminderStore {
    reminders: DashMap<ReminderId, Reminder>,
    next_id: AtomicI64,
}

impl MemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ReminderId) -> bool {
        self.reminders.contains_key(&id)
    }
}

#[async_trait]
impl ReminderStore for MemoryReminderStore {
    async fn save(&self, reminder: Reminder) -> Result<Reminder> {
        let reminder = match reminder.id() {
            Some(_) => reminder,
            None => reminder.with_id(self.next_id.fetch_add(1, Ordering::SeqCst) + 1),
        };
        if let Some(id) = reminder.id() {
            self.reminders.insert(id, reminder.clone());
        }
        Ok(reminder)
    }

    async fn find_due(&self, instant: NaiveDateTime) -> Result<Vec<Reminder>> {
        let minute = truncate_to_minute(instant);
        Ok(self
            .reminders
            .iter()
            .filter(|entry| entry.due_at() == minute)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_overdue(&self, instant: NaiveDateTime) -> Result<Vec<Reminder>> {
        let minute = truncate_to_minute(instant);
        let mut overdue: Vec<Reminder> = self
            .reminders
            .iter()
            .filter(|entry| entry.due_at() < minute)
            .map(|entry| entry.value().clone())
            .collect();
        overdue.sort_by_key(|r| (r.due_at(), r.id()));
        Ok(overdue)
    }

    async fn delete(&self, reminder: &Reminder) -> Result<()> {
        if let Some(id) = reminder.id() {
            self.reminders.remove(&id);
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.reminders.len())
    }
}
