use serenity::all::GuildId;
use sqlx::SqlitePool;

use crate::bot::commands::commands::BotResult;

pub const GUILDS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS guilds (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        joined_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
";

/// Records a guild the bot is in. Rejoining only refreshes the name.
pub async fn upsert_guild(pool: &SqlitePool, guild_id: GuildId, name: &str) -> BotResult<()> {
    sqlx::query(
        r#"
        INSERT INTO guilds (id, name)
        VALUES (?, ?)
        ON CONFLICT (id)
        DO UPDATE SET name = excluded.name
        "#,
    )
    .bind(guild_id.get().to_string())
    .bind(name)
    .execute(pool)
    .await?;

    Ok(())
}
