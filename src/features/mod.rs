//! # Features
//!
//! - **reminders**: parsing, storage, and scheduled delivery of reminders

pub mod reminders;

pub use reminders::{
    FormatError, MemoryReminderStore, ParsedMessage, Reminder, ReminderParser, ReminderScheduler,
    ReminderStore, SweepReport,
};
