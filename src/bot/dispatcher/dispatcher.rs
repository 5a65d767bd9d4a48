use std::sync::Arc;

use tracing::{debug, error, info};

use crate::bot::{chat_event::chat_event::ChatEvent, commands::commands::{BotResult, CommandT}, dispatcher::help::{help_reply, HELP_COMMAND}, replies::Replies, response::response::CommandResponse, state::def::AppState};

/// Resolves a prefixed message to a command and runs it.
///
/// `None` means the message produced no reply: no prefix, an unknown command
/// name, or a command that chose to stay silent. Run-handler failures never
/// escape; they are logged and turned into the generic error reply.
pub async fn dispatch_message(state: Arc<AppState>, event: &ChatEvent) -> Option<CommandResponse> {
    // same tokens as `ChatEvent::args`, so arguments stay aligned with the name
    let name = event.message.split_whitespace().next()?.strip_prefix(state.config.prefix.as_str())?;
    if name.is_empty() {
        return None;
    }

    let result = if name == HELP_COMMAND {
        help_reply(state.clone(), event).await.map(|reply| Some(CommandResponse::from(reply)))
    } else {
        let Some(cmd) = state.registry.resolve(name) else {
            debug!("Unknown command {name}");
            return None;
        };
        info!("{} ran {} in {}", event.user.tag, cmd.command(), event.channel_id);
        run_command(cmd, event, state.clone()).await
    };

    match result {
        Ok(response) => response,
        Err(e) => {
            error!("Command {name} failed: {e:?}");
            Some(Replies::generic_error().into())
        }
    }
}

/// Routes to a sub-action when the command has them. A missing or unknown
/// action falls back to the command's help, which lists the actions.
async fn run_command(cmd: Arc<dyn CommandT>, event: &ChatEvent, state: Arc<AppState>) -> BotResult<Option<CommandResponse>> {
    let action = match cmd.actions() {
        Some(actions) => match event.action() {
            Some(name) => Some(actions.get(name).cloned()),
            None if cmd.can_run_without_action() => None,
            None => Some(None),
        },
        None => None,
    };

    match action {
        Some(Some(action)) => action.run(event.clone(), state).await,
        Some(None) => Ok(Some(cmd.help(event.clone(), state).await?.into())),
        None => cmd.run(event.clone(), state).await,
    }
}
