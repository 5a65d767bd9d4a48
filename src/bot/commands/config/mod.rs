use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{bot::commands::{config::channel::channel_command, CommandGroup}, cmd};

pub mod channel;

pub static CONFIG_COMMANDS: Lazy<Arc<CommandGroup>> = Lazy::new(|| {
    Arc::new(CommandGroup {
        name: "config".into(),
        commands: vec![
            cmd!(channel_command(), "chan", "chans", "channels"),
        ]
    })
});
