use std::{io, sync::Arc, time::Duration};
use sqlx::SqlitePool;
use thiserror::Error;

use crate::{api::coingecko::MarketApi, bot::{choice::choice::ChoiceRegistry, commands::CommandRegistry, handler::handler::ChatClient}};

pub struct AppState {
    pub config: BotConfig,
    pub registry: Arc<CommandRegistry>,
    pub choices: Arc<ChoiceRegistry>,
    pub chat_client: Arc<dyn ChatClient>,
    pub market: Arc<dyn MarketApi>,
    pub db: SqlitePool,
}

pub struct BotSecrets {
    pub discord_token: String,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub prefix: String,
    pub coingecko_api_url: String,
    pub database_url: String,
    /// How long an interactive message waits for input before it is closed.
    pub inactivity_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum BotError {
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("JSON deserialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),
    #[error("Alias '{0}' is registered more than once")]
    DuplicateAlias(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Custom(String),
}
