//! # Command Handler
//!
//! Routes inbound chat text: `/start` gets the welcome text, a
//! `dd.MM.yyyy HH:mm <text>` message is stored as a reminder and
//! confirmed, anything else gets the format-error text. Errors never
//! escape as anything but a reply or a log line.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.0.0: Initial release

use anyhow::Result;
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::core::{Language, Replies};
use crate::features::reminders::{
    ChatId, FormatError, ParsedMessage, ReminderParser, ReminderStore,
};
use crate::gateway::ChatGateway;

pub struct CommandHandler {
    parser: ReminderParser,
    store: Arc<dyn ReminderStore>,
    replies: &'static Replies,
}

impl CommandHandler {
    pub fn new(store: Arc<dyn ReminderStore>, language: Language) -> Result<Self> {
        Ok(Self {
            parser: ReminderParser::new()?,
            store,
            replies: Replies::for_language(language),
        })
    }

    /// Handle one inbound message and send the reply through `gateway`
    ///
    /// Returns `Err` only when the reply itself could not be sent.
    pub async fn handle_message(
        &self,
        gateway: &dyn ChatGateway,
        chat_id: ChatId,
        text: &str,
    ) -> Result<()> {
        let reply = self.respond(chat_id, text).await;
        gateway.send(chat_id, reply).await
    }

    /// Decide the reply for a message, storing a reminder if it is one
    pub async fn respond(&self, chat_id: ChatId, text: &str) -> &'static str {
        debug!("Processing message from chat {chat_id}: {text:?}");

        match self.parser.parse(chat_id, text) {
            Ok(ParsedMessage::Start) => {
                info!("Sending welcome message to chat {chat_id}");
                self.replies.welcome
            }
            Ok(ParsedMessage::Reminder(reminder)) => match self.store.save(reminder).await {
                Ok(saved) => {
                    info!("Stored reminder {saved}");
                    self.replies.created
                }
                Err(e) => {
                    error!("Failed to store reminder for chat {chat_id}: {e:#}");
                    self.replies.save_failed
                }
            },
            Err(e @ (FormatError::Malformed | FormatError::EmptyBody)) => {
                debug!("Chat {chat_id} sent a message that is not a reminder: {e}");
                self.replies.format_error
            }
            Err(e) => {
                warn!("Rejected reminder from chat {chat_id}: {e}");
                self.replies.invalid_date
            }
        }
    }
}
