use std::sync::Arc;

use serenity::{all::{ChannelId, CreateInvite, EditMessage, GuildId, Http, MessageId, UserId}, async_trait};
use tracing::{debug, error, info};

use crate::bot::{chat_event::chat_event::{ChatEvent, InteractionEvent}, choice::choice::{ChoiceKey, InteractionOutcome}, commands::commands::BotResult, db::guilds::upsert_guild, dispatcher::dispatcher::dispatch_message, platforms::discord::discord::{to_create_message, to_edit_message}, replies::Replies, response::response::Reply, state::def::AppState};

/// An invite as the invite commands need it.
#[derive(Debug, Clone, PartialEq)]
pub struct InviteSummary {
    pub code: String,
    pub url: String,
    pub inviter_id: Option<UserId>,
    pub inviter_tag: Option<String>,
    pub uses: u64,
    pub channel_id: ChannelId,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn send_message(&self, channel: ChannelId, reply: &Reply) -> BotResult<MessageId>;
    async fn edit_message(&self, channel: ChannelId, message: MessageId, reply: &Reply) -> BotResult<()>;
    /// Replaces the content with `notice` and strips every interactive component.
    async fn close_message(&self, channel: ChannelId, message: MessageId, notice: &str) -> BotResult<()>;
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> BotResult<()>;
    async fn create_invite(&self, channel: ChannelId) -> BotResult<String>;
    async fn guild_invites(&self, guild: GuildId) -> BotResult<Vec<InviteSummary>>;
}

pub struct DiscordClient {
    pub http: Arc<Http>,
}

impl DiscordClient {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn send_message(&self, channel: ChannelId, reply: &Reply) -> BotResult<MessageId> {
        let message = channel.send_message(&self.http, to_create_message(reply)).await?;
        Ok(message.id)
    }

    async fn edit_message(&self, channel: ChannelId, message: MessageId, reply: &Reply) -> BotResult<()> {
        channel.edit_message(&self.http, message, to_edit_message(reply)).await?;
        Ok(())
    }

    async fn close_message(&self, channel: ChannelId, message: MessageId, notice: &str) -> BotResult<()> {
        let builder = EditMessage::new().content(notice).components(Vec::new());
        channel.edit_message(&self.http, message, builder).await?;
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> BotResult<()> {
        channel.delete_message(&self.http, message).await?;
        Ok(())
    }

    async fn create_invite(&self, channel: ChannelId) -> BotResult<String> {
        let invite = channel.create_invite(&self.http, CreateInvite::new().max_age(0).unique(false)).await?;
        Ok(invite.url())
    }

    async fn guild_invites(&self, guild: GuildId) -> BotResult<Vec<InviteSummary>> {
        let invites = guild.invites(&self.http).await?;

        Ok(invites
            .into_iter()
            .map(|invite| InviteSummary {
                url: invite.url(),
                code: invite.code,
                inviter_id: invite.inviter.as_ref().map(|u| u.id),
                inviter_tag: invite.inviter.as_ref().map(|u| u.tag()),
                uses: invite.uses,
                channel_id: invite.channel.id,
            })
            .collect())
    }
}

/// Dispatches an inbound message, sends the reply and arms its choice handler.
pub async fn handle_message(state: Arc<AppState>, event: ChatEvent) -> BotResult<()> {
    if event.user.bot {
        return Ok(());
    }

    let Some(response) = dispatch_message(state.clone(), &event).await else {
        return Ok(());
    };

    let message_id = state.chat_client.send_message(event.channel_id, &response.reply).await?;

    if let Some(options) = response.choice {
        let key = ChoiceKey::for_message(message_id, &options);
        state.choices.register(key, options.user_tag, options.handler, options.timeout).await;
    }

    Ok(())
}

/// Routes a component interaction to the choice registered on its message.
pub async fn handle_interaction(state: Arc<AppState>, event: InteractionEvent) -> BotResult<()> {
    let (channel_id, message_id) = (event.channel_id, event.message_id);

    match state.choices.invoke(state.clone(), event).await {
        InteractionOutcome::Ignored => {
            debug!("No choice accepted the interaction on message {message_id}");
        }
        InteractionOutcome::Updated(reply) => {
            state.chat_client.edit_message(channel_id, message_id, &reply).await?;
        }
        InteractionOutcome::Closed => {
            state.chat_client.delete_message(channel_id, message_id).await?;
        }
        InteractionOutcome::Failed => {
            state.chat_client.send_message(channel_id, &Replies::generic_error()).await?;
        }
    }

    Ok(())
}

/// Stores a guild the bot is in. Discord replays every guild on startup, so
/// only a fresh join (`is_new == Some(true)`) is announced. Returns whether it was one.
pub async fn record_guild(state: &AppState, guild_id: GuildId, name: &str, member_count: u64, is_new: Option<bool>) -> bool {
    let joined = is_new == Some(true);
    if joined {
        info!("Joined guild: {name} (id: {guild_id}). This guild has {member_count} members!");
    } else {
        debug!("Guild available: {name} (id: {guild_id})");
    }

    if let Err(e) = upsert_guild(&state.db, guild_id, name).await {
        error!("Failed to store guild {guild_id}: {e:?}");
    }
    joined
}
