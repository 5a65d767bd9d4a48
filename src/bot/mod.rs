use std::sync::Arc;

use serenity::all::Http;
use tracing::info;

use crate::{api::coingecko::CoinGecko, bot::{commands::commands::BotResult, handler::handler::DiscordClient, platforms::discord::event_loop::start_bot, state::def::{AppState, BotConfig, BotSecrets}}};

pub mod state;
pub mod chat_event;
pub mod choice;
pub mod dispatcher;
pub mod commands;
pub mod platforms;
pub mod db;
pub mod handler;
pub mod replies;
pub mod response;
#[cfg(test)]
pub mod testing;

/// Wires the database, the market client and the Discord client together and
/// runs until the gateway connection ends.
pub async fn run_bot(secrets: BotSecrets, config: BotConfig) -> BotResult<()> {
    let pool = db::connect(&config.database_url).await?;

    let http = Arc::new(Http::new(&secrets.discord_token));
    let chat_client = Arc::new(DiscordClient::new(http));
    let market = Arc::new(CoinGecko::new(config.coingecko_api_url.clone()));

    info!("Using prefix {} with a {}s inactivity timeout", config.prefix, config.inactivity_timeout.as_secs());
    let state = AppState::new(config, chat_client, market, pool)?;

    start_bot(state, &secrets.discord_token).await
}
