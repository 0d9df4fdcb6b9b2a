//! # Database
//!
//! SQLite persistence for pending reminders (`notification_task` table).
//! Timestamps are stored as `YYYY-MM-DD HH:MM` text so equality and
//! ordering work at minute granularity.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use sqlite::{Connection, State, Statement};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::features::reminders::model::{ChatId, Reminder, ReminderId, DUE_AT_FORMAT};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS notification_task (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        chat_id INTEGER NOT NULL,
        message TEXT NOT NULL,
        date_time TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_notification_task_date_time
        ON notification_task(date_time);
";

/// Shared handle to the reminder database. Cloning shares the connection.
#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path` and apply the schema
    pub async fn new(path: &str) -> Result<Self> {
        let connection =
            sqlite::open(path).with_context(|| format!("Failed to open database at {path}"))?;
        let database = Self::from_connection(connection).await?;
        info!("📦 Database ready at {path}");
        Ok(database)
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self> {
        let connection = sqlite::open(":memory:")?;
        Self::from_connection(connection).await
    }

    async fn from_connection(connection: Connection) -> Result<Self> {
        let database = Database {
            connection: Arc::new(Mutex::new(connection)),
        };
        database.migrate().await?;
        Ok(database)
    }

    async fn migrate(&self) -> Result<()> {
        let conn = self.connection.lock().await;
        conn.execute(SCHEMA)
            .context("Failed to apply notification_task schema")?;
        Ok(())
    }

    /// Insert a new reminder row and return its assigned id
    pub async fn insert_reminder(&self, reminder: &Reminder) -> Result<ReminderId> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare(
            "INSERT INTO notification_task (chat_id, message, date_time) VALUES (?, ?, ?)",
        )?;
        bind_reminder(&mut statement, reminder)?;
        statement.next()?;
        drop(statement);

        let mut statement = conn.prepare("SELECT last_insert_rowid()")?;
        statement.next()?;
        let id = statement.read::<i64, _>(0)?;

        debug!("Inserted reminder #{id}");
        Ok(id)
    }

    /// Write all fields of a reminder under an existing id
    pub async fn upsert_reminder(&self, id: ReminderId, reminder: &Reminder) -> Result<()> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare(
            "INSERT OR REPLACE INTO notification_task (chat_id, message, date_time, id)
             VALUES (?, ?, ?, ?)",
        )?;
        bind_reminder(&mut statement, reminder)?;
        statement.bind((4, id))?;
        statement.next()?;
        Ok(())
    }

    /// Reminders due exactly at `minute`
    pub async fn get_reminders_at(&self, minute: NaiveDateTime) -> Result<Vec<Reminder>> {
        self.query_reminders(
            "SELECT id, chat_id, message, date_time FROM notification_task
             WHERE date_time = ?",
            minute,
        )
        .await
    }

    /// Reminders due strictly before `minute`, oldest first
    pub async fn get_reminders_before(&self, minute: NaiveDateTime) -> Result<Vec<Reminder>> {
        self.query_reminders(
            "SELECT id, chat_id, message, date_time FROM notification_task
             WHERE date_time < ? ORDER BY date_time, id",
            minute,
        )
        .await
    }

    /// Remove a reminder row. Missing rows are not an error.
    pub async fn delete_reminder(&self, id: ReminderId) -> Result<()> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare("DELETE FROM notification_task WHERE id = ?")?;
        statement.bind((1, id))?;
        statement.next()?;
        Ok(())
    }

    pub async fn count_reminders(&self) -> Result<usize> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare("SELECT COUNT(*) FROM notification_task")?;
        statement.next()?;
        let count = statement.read::<i64, _>(0)?;
        Ok(count.max(0) as usize)
    }

    async fn query_reminders(&self, sql: &str, minute: NaiveDateTime) -> Result<Vec<Reminder>> {
        let conn = self.connection.lock().await;

        let mut statement = conn.prepare(sql)?;
        let minute = minute.format(DUE_AT_FORMAT).to_string();
        statement.bind((1, minute.as_str()))?;

        let mut reminders = Vec::new();
        while let State::Row = statement.next()? {
            let id = statement.read::<i64, _>("id")?;
            let chat_id: ChatId = statement.read::<i64, _>("chat_id")?;
            let body = statement.read::<String, _>("message")?;
            let date_time = statement.read::<String, _>("date_time")?;

            let due_at = NaiveDateTime::parse_from_str(&date_time, DUE_AT_FORMAT)
                .with_context(|| format!("Corrupt date_time '{date_time}' for reminder #{id}"))?;
            reminders.push(Reminder::restore(id, chat_id, body, due_at));
        }

        Ok(reminders)
    }
}

fn bind_reminder(statement: &mut Statement<'_>, reminder: &Reminder) -> Result<()> {
    let due_at = reminder.due_at().format(DUE_AT_FORMAT).to_string();
    statement.bind((1, reminder.chat_id()))?;
    statement.bind((2, reminder.body()))?;
    statement.bind((3, due_at.as_str()))?;
    Ok(())
}
