use sqlx::SqlitePool;

use crate::bot::commands::commands::BotResult;

pub const TOKENS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS tokens (
        symbol TEXT PRIMARY KEY,
        coin_id TEXT NOT NULL,
        name TEXT NOT NULL
    );
";

/// `(symbol, market data id, display name)`
pub const SUPPORTED_TOKENS: [(&str, &str, &str); 7] = [
    ("FTM", "fantom", "Fantom"),
    ("SPIRIT", "spiritswap", "SpiritSwap"),
    ("TOMB", "tomb", "Tomb"),
    ("REAPER", "reaper-token", "Reaper"),
    ("BOO", "spookyswap", "SpookySwap"),
    ("SPELL", "spell-token", "Spell"),
    ("BTC", "bitcoin", "Bitcoin"),
];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Token {
    pub symbol: String,
    pub coin_id: String,
    pub name: String,
}

pub async fn fetch_supported_tokens(pool: &SqlitePool) -> BotResult<Vec<Token>> {
    let tokens = sqlx::query_as::<_, Token>("SELECT symbol, coin_id, name FROM tokens ORDER BY rowid")
        .fetch_all(pool)
        .await?;

    Ok(tokens)
}

/// Case-insensitive lookup by symbol.
pub async fn find_token(pool: &SqlitePool, symbol: &str) -> BotResult<Option<Token>> {
    let token = sqlx::query_as::<_, Token>("SELECT symbol, coin_id, name FROM tokens WHERE symbol = ? COLLATE NOCASE")
        .bind(symbol)
        .fetch_optional(pool)
        .await?;

    Ok(token)
}
