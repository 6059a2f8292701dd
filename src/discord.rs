//! Discord implementation of the gateway seams, on top of serenity.
//!
//! Connection handling, sharding and permission resolution stay inside
//! serenity; this module only adapts its types.

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{
    Channel, ChannelId, Client, Colour, Context, CreateEmbed, CreateMessage, EditMessage,
    EventHandler, GatewayIntents, GetMessages, Message, MessageId, Ready,
};
use tracing::{debug, info, warn};

use crate::commands::CommandDispatcher;
use crate::config::Config;
use crate::error::Result;
use crate::gateway::{
    Card, ChannelInfo, ChatGateway, Direction, PageRequest, StatusHandle, StatusSink,
};
use crate::record::{HistoryMessage, MessageRecord};

/// Map a serenity message to an export record.
pub fn to_history_message(msg: &Message) -> HistoryMessage {
    HistoryMessage::new(
        msg.id.get(),
        MessageRecord {
            content: msg.content.clone(),
            author: msg.author.tag(),
            author_id: msg.author.id.get(),
            timestamp: msg.timestamp.to_string(),
            attachments: msg.attachments.iter().map(|a| a.url.clone()).collect(),
            jump_url: msg.link(),
        },
    )
}

/// Put a fetched page into walk order.
///
/// Discord returns each page newest-first regardless of the cursor.
fn order_page(page: &mut [HistoryMessage], direction: Direction) {
    match direction {
        Direction::Forward => page.sort_by_key(|m| m.id),
        Direction::Backward => page.sort_by_key(|m| Reverse(m.id)),
    }
}

/// Channel lookup and history paging over the Discord HTTP API.
#[derive(Clone)]
pub struct SerenityGateway {
    ctx: Context,
}

impl SerenityGateway {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ChatGateway for SerenityGateway {
    async fn channel(&self, channel_id: u64) -> Result<Option<ChannelInfo>> {
        // Snowflakes are never zero
        if channel_id == 0 {
            return Ok(None);
        }

        match ChannelId::new(channel_id).to_channel(&self.ctx).await {
            Ok(Channel::Guild(channel)) => Ok(Some(ChannelInfo {
                id: channel_id,
                name: channel.name,
            })),
            Ok(Channel::Private(channel)) => Ok(Some(ChannelInfo {
                id: channel_id,
                name: channel.name(),
            })),
            Ok(_) => Ok(None),
            Err(err) => {
                debug!(channel_id, "Channel lookup failed: {}", err);
                Ok(None)
            }
        }
    }

    async fn fetch_page(
        &self,
        channel_id: u64,
        request: PageRequest,
    ) -> Result<Vec<HistoryMessage>> {
        if channel_id == 0 || request.cursor == Some(0) {
            return Ok(Vec::new());
        }

        let mut builder = GetMessages::new().limit(request.limit);
        builder = match (request.direction, request.cursor) {
            // `after` needs a non-zero ID; 1 precedes every real message
            (Direction::Forward, cursor) => {
                builder.after(MessageId::new(cursor.unwrap_or(1).max(1)))
            }
            (Direction::Backward, Some(before)) => builder.before(MessageId::new(before)),
            (Direction::Backward, None) => builder,
        };

        let messages = ChannelId::new(channel_id)
            .messages(&self.ctx, builder)
            .await?;

        let mut page: Vec<HistoryMessage> = messages.iter().map(to_history_message).collect();
        order_page(&mut page, request.direction);
        Ok(page)
    }
}

/// Replies into the channel a command was invoked from.
pub struct ChannelReply {
    ctx: Context,
    channel_id: ChannelId,
}

impl ChannelReply {
    pub fn new(ctx: Context, channel_id: ChannelId) -> Self {
        Self { ctx, channel_id }
    }
}

#[async_trait]
impl StatusSink for ChannelReply {
    async fn send(&self, text: &str) -> Result<StatusHandle> {
        let sent = self.channel_id.say(&self.ctx, text).await?;
        Ok(StatusHandle(sent.id.get()))
    }

    async fn edit(&self, handle: StatusHandle, text: &str) -> Result<()> {
        self.channel_id
            .edit_message(
                &self.ctx,
                MessageId::new(handle.0),
                EditMessage::new().content(text),
            )
            .await?;
        Ok(())
    }

    async fn send_card(&self, card: &Card) -> Result<()> {
        let embed = CreateEmbed::new()
            .title(card.title)
            .description(card.description)
            .colour(Colour::new(card.colour))
            .fields(
                card.fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone(), false)),
            );
        self.channel_id
            .send_message(&self.ctx, CreateMessage::new().embed(embed))
            .await?;
        Ok(())
    }
}

/// Handler for Discord gateway events.
pub struct ExportHandler {
    dispatcher: Arc<CommandDispatcher>,
}

impl ExportHandler {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }
}

#[async_trait]
impl EventHandler for ExportHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "Bot is ready"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Skip bot messages to prevent loops
        if msg.author.bot {
            return;
        }
        if !msg.content.trim_start().starts_with(&self.dispatcher.config().prefix) {
            return;
        }

        let is_admin = msg
            .author_permissions(&ctx)
            .is_some_and(|perms| perms.administrator());

        let gateway = SerenityGateway::new(ctx.clone());
        let reply = ChannelReply::new(ctx, msg.channel_id);
        self.dispatcher
            .handle_text(&gateway, &reply, &msg.content, is_admin)
            .await;
    }
}

/// Connect to Discord and serve commands until Ctrl-C.
pub async fn run_bot(config: Arc<Config>) -> Result<()> {
    config.validate()?;

    let dispatcher = Arc::new(CommandDispatcher::new(config.clone()));
    let mut client = Client::builder(&config.token, ExportHandler::intents())
        .event_handler(ExportHandler::new(dispatcher))
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", err);
            return;
        }
        info!("Shutting down");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}
