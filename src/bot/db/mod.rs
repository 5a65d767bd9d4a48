use std::str::FromStr;

use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, SqlitePool};
use tracing::info;

use crate::bot::{commands::commands::BotResult, db::{guilds::GUILDS_TABLE, tokens::{SUPPORTED_TOKENS, TOKENS_TABLE}}};

pub mod guilds;
pub mod tokens;

pub async fn connect(database_url: &str) -> BotResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;

    initialize_database(&pool).await?;
    info!("Connected to database {}", database_url);
    Ok(pool)
}

/// Creates the tables and seeds the default supported tokens. Safe to run on every start.
pub async fn initialize_database(pool: &SqlitePool) -> BotResult<()> {
    sqlx::query(GUILDS_TABLE).execute(pool).await?;
    sqlx::query(TOKENS_TABLE).execute(pool).await?;

    for (symbol, coin_id, name) in SUPPORTED_TOKENS {
        sqlx::query("INSERT OR IGNORE INTO tokens (symbol, coin_id, name) VALUES (?, ?, ?)")
            .bind(symbol)
            .bind(coin_id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    Ok(())
}
