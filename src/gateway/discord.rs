//! # Discord Gateway
//!
//! [`ChatGateway`] over serenity's HTTP client. A chat id is a Discord
//! channel id; long texts are sent as several messages. If a multi-part
//! send fails midway, the next send of the same text to the same channel
//! resumes after the last part that went out.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Resume interrupted multi-part sends instead of repeating parts
//! - 1.0.0: Initial release

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use log::{debug, info};
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::split::{split_message, DISCORD_MESSAGE_LIMIT};
use super::ChatGateway;
use crate::features::reminders::model::ChatId;

/// (chat, text fingerprint) of an interrupted multi-part send
type PartKey = (ChatId, u64);

/// Number of parts already delivered for texts whose send did not finish
#[derive(Debug, Clone, Default)]
pub struct PartProgress {
    sent: Arc<DashMap<PartKey, usize>>,
}

impl PartProgress {
    fn key(chat_id: ChatId, text: &str) -> PartKey {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        (chat_id, hasher.finish())
    }

    /// Parts of `text` that already reached `chat_id`
    pub fn already_sent(&self, chat_id: ChatId, text: &str) -> usize {
        self.sent
            .get(&Self::key(chat_id, text))
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn record(&self, chat_id: ChatId, text: &str, parts_sent: usize) {
        self.sent.insert(Self::key(chat_id, text), parts_sent);
    }

    pub fn finish(&self, chat_id: ChatId, text: &str) {
        self.sent.remove(&Self::key(chat_id, text));
    }
}

#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
    progress: PartProgress,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self {
            http,
            progress: PartProgress::default(),
        }
    }

    /// Map a chat id onto a Discord channel id
    pub fn channel_for(chat_id: ChatId) -> Result<ChannelId> {
        u64::try_from(chat_id)
            .ok()
            .filter(|id| *id != 0)
            .map(ChannelId)
            .ok_or_else(|| anyhow::anyhow!("Invalid Discord channel id: {}", chat_id))
    }
}

#[async_trait]
impl ChatGateway for DiscordGateway {
    async fn send(&self, chat_id: ChatId, text: &str) -> Result<()> {
        let channel = Self::channel_for(chat_id)?;

        let parts = split_message(text, DISCORD_MESSAGE_LIMIT);
        let skip = self.progress.already_sent(chat_id, text).min(parts.len());
        if skip > 0 {
            info!(
                "Resuming send to channel {} at part {}/{}",
                chat_id,
                skip + 1,
                parts.len()
            );
        }

        for (index, part) in parts.iter().enumerate().skip(skip) {
            channel
                .say(&self.http, part)
                .await
                .map_err(|e| anyhow::anyhow!("Discord send to {} failed: {}", chat_id, e))?;
            if parts.len() > 1 {
                self.progress.record(chat_id, text, index + 1);
            }
        }
        self.progress.finish(chat_id, text);

        debug!("Sent {} bytes to channel {}", text.len(), chat_id);
        Ok(())
    }
}
