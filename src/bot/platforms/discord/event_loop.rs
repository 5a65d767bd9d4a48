use std::sync::Arc;

use serenity::{all::{ChannelId, Context, CreateInteractionResponse, EventHandler, GatewayIntents, Guild, GuildChannel, GuildId, Interaction, Message, MessageId, Ready}, async_trait, Client};
use tracing::{error, info, warn};

use crate::bot::{commands::commands::BotResult, handler::handler::{handle_interaction, handle_message, record_guild}, platforms::discord::discord::{map_component, map_message}, state::def::AppState};

pub struct Handler {
    pub state: Arc<AppState>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("{} is connected to Discord in {} guilds", ready.user.name, ready.guilds.len());
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        if let Err(e) = handle_message(self.state.clone(), map_message(&msg)).await {
            error!("Failed to handle message {}: {e:?}", msg.id);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Component(component) = interaction else {
            return;
        };

        let event = map_component(&component);
        if !self.state.choices.accepts(&event).await {
            return;
        }

        if let Err(e) = component.create_response(&ctx.http, CreateInteractionResponse::Acknowledge).await {
            warn!("Failed to acknowledge interaction on message {}: {e:?}", event.message_id);
        }

        if let Err(e) = handle_interaction(self.state.clone(), event).await {
            error!("Failed to handle interaction: {e:?}");
        }
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: Option<bool>) {
        record_guild(&self.state, guild.id, &guild.name, guild.member_count, is_new).await;
    }

    async fn message_delete(&self, _ctx: Context, _channel_id: ChannelId, deleted_message_id: MessageId, _guild_id: Option<GuildId>) {
        self.state.choices.retire(deleted_message_id).await;
    }

    async fn channel_delete(&self, _ctx: Context, channel: GuildChannel, _messages: Option<Vec<Message>>) {
        self.state.choices.retire_channel(channel.id).await;
    }
}

pub async fn start_bot(state: Arc<AppState>, token: &str) -> BotResult<()> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_INVITES;

    let mut client = Client::builder(token, intents)
        .event_handler(Handler { state })
        .await?;

    info!("Starting Discord client");
    client.start().await?;
    Ok(())
}
