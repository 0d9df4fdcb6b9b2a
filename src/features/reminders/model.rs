//! Reminder data model
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use chrono::{NaiveDateTime, Timelike};

/// Identity of the chat a reminder is delivered to
pub type ChatId = i64;

/// Store-assigned reminder identity
pub type ReminderId = i64;

/// Storage and display format of `due_at`. Minute resolution.
pub const DUE_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A request to deliver `body` to `chat_id` at the minute `due_at`
///
/// Fields are immutable once built; only the store assigns `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    id: Option<ReminderId>,
    chat_id: ChatId,
    body: String,
    due_at: NaiveDateTime,
}

impl Reminder {
    /// Create an unsaved reminder. `due_at` is truncated to the minute.
    ///
    /// Returns `None` if the body is empty after trimming.
    pub fn new(chat_id: ChatId, due_at: NaiveDateTime, body: impl Into<String>) -> Option<Self> {
        let body = body.into();
        let body = body.trim();
        if body.is_empty() {
            return None;
        }

        Some(Self {
            id: None,
            chat_id,
            body: body.to_string(),
            due_at: truncate_to_minute(due_at),
        })
    }

    /// Rebuild a reminder read back from storage
    pub(crate) fn restore(
        id: ReminderId,
        chat_id: ChatId,
        body: String,
        due_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Some(id),
            chat_id,
            body,
            due_at: truncate_to_minute(due_at),
        }
    }

    /// Attach a freshly assigned identity. Existing identities are kept.
    pub(crate) fn with_id(mut self, id: ReminderId) -> Self {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self
    }

    pub fn id(&self) -> Option<ReminderId> {
        self.id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn due_at(&self) -> NaiveDateTime {
        self.due_at
    }

    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }
}

impl std::fmt::Display for Reminder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "#{id}")?,
            None => write!(f, "#new")?,
        }
        write!(
            f,
            " chat={} due={}",
            self.chat_id,
            self.due_at.format(DUE_AT_FORMAT)
        )
    }
}

/// Drop seconds and sub-second precision
pub fn truncate_to_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(instant)
}
