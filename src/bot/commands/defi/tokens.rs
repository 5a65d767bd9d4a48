use std::sync::Arc;

use crate::bot::{chat_event::chat_event::ChatEvent, commands::commands::{BotResult, Category, CommandInfo, CommandT, FnCommand}, db::tokens::fetch_supported_tokens, response::{compose::{compose_embed_message, get_header, thumbnails, EmbedOptions}, emoji::get_emoji, response::{CommandResponse, Reply}}, state::def::AppState};

pub fn tokens_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        CommandInfo::new("tokens", "Tokens", Category::Defi).runs_without_action(),
        |event, state| Box::pin(async move { run_tokens(event, state).await }),
        |event, state| Box::pin(async move { Ok(tokens_help(&event, &state.config.prefix)) }),
    ))
}

async fn run_tokens(event: ChatEvent, state: Arc<AppState>) -> BotResult<Option<CommandResponse>> {
    let tokens = fetch_supported_tokens(&state.db).await?;

    let description: String = tokens
        .iter()
        .map(|t| format!("{} **{}**\n", get_emoji(&t.symbol), t.symbol.to_uppercase()))
        .collect();

    let embed = compose_embed_message(Some(&event), EmbedOptions {
        author: Some(("Supported tokens".to_string(), None)),
        description: Some(description),
        ..Default::default()
    });

    Ok(Some(CommandResponse::new(Reply {
        content: Some(get_header("View all supported tokens", &event.user.tag, None)),
        embeds: vec![embed],
        ..Default::default()
    })))
}

fn tokens_help(event: &ChatEvent, prefix: &str) -> Reply {
    Reply::embed(compose_embed_message(Some(event), EmbedOptions {
        thumbnail: Some(thumbnails::TOKENS.to_string()),
        description: Some("Check the list of supported tokens.".to_string()),
        usage: Some(format!("{prefix}tokens")),
        ..Default::default()
    }))
}

#[cfg(test)]
mod tests {
    use crate::bot::{handler::handler::handle_message, testing::{message, test_state, FakeMarket}};

    #[tokio::test]
    async fn lists_seeded_tokens_with_emoji() {
        let (state, client) = test_state(FakeMarket::default()).await;

        handle_message(state.clone(), message("!tkn")).await.unwrap();

        let sent = client.sent().await;
        let description = sent[0].embeds[0].description.clone().unwrap();
        assert!(description.starts_with("<:ftm:967285237686108212> **FTM**\n"));
        assert_eq!(description.lines().count(), 7);
        assert_eq!(sent[0].embeds[0].author.as_ref().map(|a| a.name.as_str()), Some("Supported tokens"));
        assert!(!state.choices.is_armed(serenity::all::MessageId::new(1000)).await);
    }
}
