use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::bot::{run_bot, state::def::{BotConfig, BotSecrets}};

pub mod api;
pub mod bot;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let secrets = match BotSecrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_bot(secrets, config).await {
        error!("Bot stopped: {e:?}");
        std::process::exit(1);
    }
}
