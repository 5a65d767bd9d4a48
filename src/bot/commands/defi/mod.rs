use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{bot::commands::{defi::{ticker::ticker_command, tokens::tokens_command}, CommandGroup}, cmd};

pub mod chart;
pub mod ticker;
pub mod tokens;

pub static DEFI_COMMANDS: Lazy<Arc<CommandGroup>> = Lazy::new(|| {
    Arc::new(CommandGroup {
        name: "defi".into(),
        commands: vec![
            cmd!(ticker_command(), "tick"),
            cmd!(tokens_command(), "token", "tkn", "currency", "currencies", "cur", "curs"),
        ]
    })
});
