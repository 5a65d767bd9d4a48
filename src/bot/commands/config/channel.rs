use std::sync::Arc;

use crate::bot::{commands::commands::{Category, CommandInfo, CommandT, FnCommand}, response::{compose::work_in_progress, response::CommandResponse}};

/// Notification channel setup. Not available yet.
pub fn channel_command() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        CommandInfo::new("channel", "Setup channels to receive notifications", Category::Config)
            .runs_without_action()
            .experimental(),
        |event, _state| Box::pin(async move { Ok(Some(CommandResponse::from(work_in_progress(&event)))) }),
        |event, _state| Box::pin(async move { Ok(work_in_progress(&event)) }),
    ))
}
