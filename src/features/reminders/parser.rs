//! # Reminder Parser
//!
//! Turns raw chat text into a `/start` greeting request or an unsaved
//! [`Reminder`]. Accepted reminder shape: `dd.MM.yyyy HH:mm <text>`.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Match the whole message as received; no outer trimming
//! - 1.0.0: Initial release

use anyhow::Result;
use chrono::NaiveDateTime;
use regex::Regex;

use super::model::{ChatId, Reminder};

/// Greeting command, never treated as a reminder
pub const START_COMMAND: &str = "/start";

const REMINDER_PATTERN: &str = r"(?s)^([0-9]{2}\.[0-9]{2}\.[0-9]{4} [0-9]{2}:[0-9]{2})\s+(.+)$";
const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// What an inbound message asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    /// The `/start` greeting
    Start,
    /// A reminder to store
    Reminder(Reminder),
}

/// Why a message was not accepted as a reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// Text does not have the `dd.MM.yyyy HH:mm <text>` shape
    Malformed,
    /// Shape matched but the date or time does not exist (e.g. 31.02)
    InvalidDateTime(String),
    /// Only whitespace after the date-time prefix
    EmptyBody,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Malformed => write!(f, "message does not match 'dd.MM.yyyy HH:mm text'"),
            FormatError::InvalidDateTime(value) => write!(f, "invalid date or time: {value}"),
            FormatError::EmptyBody => write!(f, "reminder text is empty"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Stateless message parser; holds the compiled reminder pattern
#[derive(Debug, Clone)]
pub struct ReminderParser {
    pattern: Regex,
}

impl ReminderParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(REMINDER_PATTERN)?,
        })
    }

    /// Classify `text` received from `chat_id`. Performs no I/O.
    ///
    /// The message must match in full; only the reminder body is trimmed.
    pub fn parse(&self, chat_id: ChatId, text: &str) -> Result<ParsedMessage, FormatError> {
        if text == START_COMMAND {
            return Ok(ParsedMessage::Start);
        }

        let captures = self.pattern.captures(text).ok_or(FormatError::Malformed)?;
        let date_time = &captures[1];
        let body = &captures[2];

        let due_at = NaiveDateTime::parse_from_str(date_time, DATE_TIME_FORMAT)
            .map_err(|_| FormatError::InvalidDateTime(date_time.to_string()))?;

        Reminder::new(chat_id, due_at, body)
            .map(ParsedMessage::Reminder)
            .ok_or(FormatError::EmptyBody)
    }
}
