//! # Reminders Feature
//!
//! Date-prefixed reminders: parsed from chat text, stored, and delivered
//! back to the originating chat at their minute.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.0.0: Initial release

pub mod model;
pub mod parser;
pub mod scheduler;
pub mod store;

pub use model::{ChatId, Reminder, ReminderId};
pub use parser::{FormatError, ParsedMessage, ReminderParser};
pub use scheduler::{ReminderScheduler, SweepReport};
pub use store::{MemoryReminderStore, ReminderStore};
