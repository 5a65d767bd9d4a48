use std::{env, sync::Arc, time::Duration};

use sqlx::SqlitePool;

use crate::{api::coingecko::MarketApi, bot::{choice::choice::ChoiceRegistry, commands::{commands::BotResult, CommandRegistry}, handler::handler::ChatClient, state::def::{AppState, BotConfig, BotError, BotSecrets}}};

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://defibot.db?mode=rwc";
pub const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 60;

impl BotSecrets {
    pub fn from_env() -> BotResult<Self> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| BotError::MissingEnv("DISCORD_TOKEN".to_string()))?;

        Ok(Self { discord_token })
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        BotConfig {
            prefix: DEFAULT_PREFIX.to_string(),
            coingecko_api_url: DEFAULT_COINGECKO_API_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS),
        }
    }
}

impl BotConfig {
    pub fn from_env() -> BotResult<Self> {
        let defaults = BotConfig::default();

        let inactivity_timeout = match env::var("INACTIVITY_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.trim().parse::<u64>()
                    .map_err(|e| BotError::InvalidEnv("INACTIVITY_TIMEOUT_SECS".to_string(), e.to_string()))?;
                Duration::from_secs(secs)
            }
            Err(_) => defaults.inactivity_timeout,
        };

        Ok(BotConfig {
            prefix: env::var("COMMAND_PREFIX").unwrap_or(defaults.prefix),
            coingecko_api_url: env::var("COINGECKO_API_URL").unwrap_or(defaults.coingecko_api_url),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            inactivity_timeout,
        })
    }
}

impl AppState {
    pub fn new(config: BotConfig, chat_client: Arc<dyn ChatClient>, market: Arc<dyn MarketApi>, db: SqlitePool) -> BotResult<Arc<Self>> {
        let registry = Arc::new(CommandRegistry::new()?);
        let choices = Arc::new(ChoiceRegistry::new(chat_client.clone(), config.inactivity_timeout));

        Ok(Arc::new(AppState {
            config,
            registry,
            choices,
            chat_client,
            market,
            db,
        }))
    }
}
