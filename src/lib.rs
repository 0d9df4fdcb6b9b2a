// Core layer - configuration and reply texts
pub mod core;

// Features layer - reminder parsing, storage and delivery
pub mod features;

// Chat transport seam and its Discord implementation
pub mod gateway;

// Infrastructure
pub mod database;

// Application layer
pub mod command_handler;

// Re-export core config
pub use crate::core::Config;

pub use command_handler::CommandHandler;
pub use database::Database;
pub use features::{
    FormatError, MemoryReminderStore, ParsedMessage, Reminder, ReminderParser, ReminderScheduler,
    ReminderStore, SweepReport,
};
pub use gateway::{ChatGateway, DiscordGateway};
