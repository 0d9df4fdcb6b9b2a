use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;

use reminder_bot::core::Config;
use reminder_bot::database::Database;
use reminder_bot::features::reminders::{ReminderScheduler, ReminderStore};
use reminder_bot::gateway::DiscordGateway;
use reminder_bot::CommandHandler;

struct Handler {
    command_handler: Arc<CommandHandler>,
}

impl Handler {
    fn new(command_handler: CommandHandler) -> Self {
        Handler {
            command_handler: Arc::new(command_handler),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let chat_id = match i64::try_from(msg.channel_id.0) {
            Ok(id) => id,
            Err(_) => {
                error!("Channel id {} does not fit a chat id", msg.channel_id);
                return;
            }
        };

        let gateway = DiscordGateway::new(ctx.http.clone());
        if let Err(e) = self
            .command_handler
            .handle_message(&gateway, chat_id, &msg.content)
            .await
        {
            error!("Failed to reply to chat {chat_id}: {e:#}");
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());
        info!("🤖 Bot ID: {}", ready.user.id);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting reminder bot...");

    let database = Arc::new(Database::new(&config.database_path).await?);
    info!(
        "📋 {} pending reminder(s) in store",
        database.count().await?
    );

    let command_handler = CommandHandler::new(database.clone(), config.language)?;
    let handler = Handler::new(command_handler);

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    // Start the reminder scheduler
    let gateway = Arc::new(DiscordGateway::new(client.cache_and_http.http.clone()));
    let scheduler = Arc::new(ReminderScheduler::new(
        database.clone(),
        gateway,
        config.deliver_overdue,
    ));
    tokio::spawn(scheduler.run());

    // Stop the shards on Ctrl-C
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            return;
        }
        info!("Shutting down...");
        shard_manager.lock().await.shutdown_all().await;
    });

    info!("Establishing WebSocket connection to Discord gateway...");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
