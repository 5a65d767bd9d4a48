use std::{collections::HashMap, sync::{atomic::{AtomicU64, Ordering}, Arc}};

use serenity::{all::{ChannelId, GuildId, MessageId, UserId}, async_trait};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::sync::Mutex;

use crate::{api::coingecko::{Coin, CoinImage, CoinMarketData, HistoricalMarketData, MarketApi}, bot::{chat_event::chat_event::{ChatEvent, ChatUser, InteractionEvent}, commands::commands::BotResult, db::initialize_database, handler::handler::{ChatClient, InviteSummary}, response::response::Reply, state::def::{AppState, BotConfig, BotError}}};

#[derive(Debug, Clone)]
pub enum ClientCall {
    Send { channel: ChannelId, message: MessageId, reply: Reply },
    Edit { channel: ChannelId, message: MessageId, reply: Reply },
    Close { channel: ChannelId, message: MessageId, notice: String },
    Delete { channel: ChannelId, message: MessageId },
    CreateInvite { channel: ChannelId },
    GuildInvites { guild: GuildId },
}

/// Records every outbound call. Sent messages get ids counting up from 1000.
#[derive(Default)]
pub struct FakeChatClient {
    calls: Mutex<Vec<ClientCall>>,
    next_message: AtomicU64,
    pub invites: Mutex<Vec<InviteSummary>>,
}

impl FakeChatClient {
    pub async fn calls(&self) -> Vec<ClientCall> {
        self.calls.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<Reply> {
        self.calls().await.into_iter().filter_map(|c| match c {
            ClientCall::Send { reply, .. } => Some(reply),
            _ => None,
        }).collect()
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn send_message(&self, channel: ChannelId, reply: &Reply) -> BotResult<MessageId> {
        let message = MessageId::new(1000 + self.next_message.fetch_add(1, Ordering::SeqCst));
        self.calls.lock().await.push(ClientCall::Send { channel, message, reply: reply.clone() });
        Ok(message)
    }

    async fn edit_message(&self, channel: ChannelId, message: MessageId, reply: &Reply) -> BotResult<()> {
        self.calls.lock().await.push(ClientCall::Edit { channel, message, reply: reply.clone() });
        Ok(())
    }

    async fn close_message(&self, channel: ChannelId, message: MessageId, notice: &str) -> BotResult<()> {
        self.calls.lock().await.push(ClientCall::Close { channel, message, notice: notice.to_string() });
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> BotResult<()> {
        self.calls.lock().await.push(ClientCall::Delete { channel, message });
        Ok(())
    }

    async fn create_invite(&self, channel: ChannelId) -> BotResult<String> {
        self.calls.lock().await.push(ClientCall::CreateInvite { channel });
        Ok("https://discord.gg/defi".to_string())
    }

    async fn guild_invites(&self, guild: GuildId) -> BotResult<Vec<InviteSummary>> {
        self.calls.lock().await.push(ClientCall::GuildInvites { guild });
        Ok(self.invites.lock().await.clone())
    }
}

/// Serves a single coin, `fantom`, and a flat-then-rising price series.
#[derive(Default)]
pub struct FakeMarket {
    pub fail: bool,
    pub history_calls: Mutex<Vec<(String, String, u32)>>,
}

impl FakeMarket {
    pub fn failing() -> Self {
        FakeMarket { fail: true, ..Default::default() }
    }

    pub fn fantom() -> Coin {
        let usd = |v: f64| HashMap::from([("usd".to_string(), v)]);
        Coin {
            id: "fantom".to_string(),
            symbol: "ftm".to_string(),
            name: "Fantom".to_string(),
            image: CoinImage {
                thumb: None,
                small: Some("https://assets.coingecko.com/coins/images/4001/small/Fantom.png".to_string()),
                large: None,
            },
            market_cap_rank: Some(55),
            market_data: CoinMarketData {
                current_price: usd(0.45),
                market_cap: usd(1_234_567_890.0),
                price_change_percentage_1h_in_currency: usd(0.5),
                price_change_percentage_24h_in_currency: usd(-2.25),
                price_change_percentage_7d_in_currency: usd(10.0),
            },
        }
    }
}

#[async_trait]
impl MarketApi for FakeMarket {
    async fn get_coin(&self, id: &str) -> BotResult<Coin> {
        if self.fail {
            return Err(BotError::Custom("market unavailable".to_string()));
        }
        match id {
            "fantom" => Ok(FakeMarket::fantom()),
            other => Err(BotError::NotFound(other.to_string())),
        }
    }

    async fn get_historical_market_data(&self, id: &str, currency: &str, days: u32) -> BotResult<HistoricalMarketData> {
        self.history_calls.lock().await.push((id.to_string(), currency.to_string(), days));
        if self.fail {
            return Err(BotError::Custom("market unavailable".to_string()));
        }

        let day = 86_400_000i64;
        let points: Vec<(i64, f64)> = (0..=days as i64).map(|d| (d * day, 0.4 + d as f64 * 0.01)).collect();
        Ok(HistoricalMarketData::from_points(&points))
    }
}

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    initialize_database(&pool).await.expect("schema");
    pool
}

pub async fn test_state(market: impl Into<Arc<FakeMarket>>) -> (Arc<AppState>, Arc<FakeChatClient>) {
    let client = Arc::new(FakeChatClient::default());
    let market: Arc<FakeMarket> = market.into();
    let state = AppState::new(BotConfig::default(), client.clone(), market, memory_pool().await)
        .expect("state");
    (state, client)
}

pub fn user(id: u64, tag: &str) -> ChatUser {
    ChatUser { id: UserId::new(id), tag: tag.to_string(), bot: false }
}

pub fn message(text: &str) -> ChatEvent {
    ChatEvent {
        message_id: MessageId::new(1),
        channel_id: ChannelId::new(20),
        guild_id: Some(GuildId::new(30)),
        user: user(40, "neko#0001"),
        message: text.to_string(),
    }
}

pub fn select(message_id: MessageId, custom_id: &str, value: &str) -> InteractionEvent {
    InteractionEvent {
        message_id,
        channel_id: ChannelId::new(20),
        guild_id: Some(GuildId::new(30)),
        user: user(40, "neko#0001"),
        custom_id: custom_id.to_string(),
        values: vec![value.to_string()],
    }
}
