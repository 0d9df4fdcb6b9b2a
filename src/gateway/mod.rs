//! # Chat Gateway
//!
//! The seam between the reminder core and the chat transport. The core only
//! ever sends text to a chat id; inbound messages are pushed into
//! [`crate::command_handler::CommandHandler`] by the transport's event loop.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

pub mod discord;
pub mod split;

use anyhow::Result;
use async_trait::async_trait;

use crate::features::reminders::model::ChatId;

pub use discord::DiscordGateway;

/// Outbound side of a chat transport
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send `text` to `chat_id`. An `Err` is a delivery failure.
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
