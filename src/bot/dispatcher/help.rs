use std::sync::Arc;

use crate::bot::{chat_event::chat_event::ChatEvent, commands::commands::BotResult, response::{compose::{compose_embed_message, get_list_commands, thumbnails, EmbedOptions}, response::Reply}, state::def::AppState};

pub const HELP_COMMAND: &str = "help";

/// `help`, `help <command>` or `help <command> <action>`.
pub async fn help_reply(state: Arc<AppState>, event: &ChatEvent) -> BotResult<Reply> {
    let args = event.args();

    let Some(cmd) = args.get(1).and_then(|name| state.registry.resolve(name)) else {
        return Ok(help_menu(&state, event));
    };

    let action = args.get(2).and_then(|name| cmd.actions().and_then(|actions| actions.get(*name).cloned()));
    match action {
        Some(action) => action.help(event.clone(), state.clone()).await,
        None => cmd.help(event.clone(), state.clone()).await,
    }
}

fn help_menu(state: &AppState, event: &ChatEvent) -> Reply {
    let prefix = &state.config.prefix;
    let mut embed = compose_embed_message(Some(event), EmbedOptions {
        title: Some("Help Menu".to_string()),
        thumbnail: Some(thumbnails::HELP.to_string()),
        description: Some(format!("Type `{prefix}help <command>` to learn more about a command.")),
        ..Default::default()
    });

    for (category, commands) in state.registry.by_category() {
        let listed = get_list_commands(prefix, commands.iter().map(|c| (c.command(), c.name())));
        embed = embed.field(category.to_string(), listed, false);
    }

    Reply::embed(embed)
}
