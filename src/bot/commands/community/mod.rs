use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{bot::commands::{community::invite::invite_command, CommandGroup}, cmd};

pub mod invite;

pub static COMMUNITY_COMMANDS: Lazy<Arc<CommandGroup>> = Lazy::new(|| {
    Arc::new(CommandGroup {
        name: "community".into(),
        commands: vec![
            cmd!(invite_command()),
        ]
    })
});
