use serenity::all::{ChannelId, GuildId, MessageId, UserId};

/// An inbound chat message, detached from the gateway types.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub user: ChatUser,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: UserId,
    pub tag: String,
    pub bot: bool,
}

/// A component interaction (select menu choice or button press) on a message the bot sent.
#[derive(Debug, Clone)]
pub struct InteractionEvent {
    pub message_id: MessageId,
    pub channel_id: ChannelId,
    pub guild_id: Option<GuildId>,
    pub user: ChatUser,
    pub custom_id: String,
    pub values: Vec<String>,
}

impl ChatEvent {
    pub fn args(&self) -> Vec<&str> {
        self.message.split_whitespace().collect()
    }

    /// The second token, which commands with sub-actions treat as the action name.
    pub fn action(&self) -> Option<&str> {
        self.message.split_whitespace().nth(1)
    }
}
