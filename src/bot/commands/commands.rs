use std::{fmt, sync::Arc};
use futures::future::BoxFuture;
use once_cell::sync::Lazy;

use crate::bot::{chat_event::chat_event::ChatEvent, commands::{community::COMMUNITY_COMMANDS, config::CONFIG_COMMANDS, defi::DEFI_COMMANDS, CommandGroup, CommandMap}, response::response::{CommandResponse, Reply}, state::def::{AppState, BotError}};

pub type BotResult<T> = Result<T, BotError>;

pub static COMMAND_GROUPS: Lazy<Vec<Arc<CommandGroup>>> = Lazy::new(|| {
    vec![
        COMMUNITY_COMMANDS.clone(),
        CONFIG_COMMANDS.clone(),
        DEFI_COMMANDS.clone(),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Community,
    Config,
    Defi,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Community => "Community",
            Category::Config => "Config",
            Category::Defi => "Defi",
        };
        write!(f, "{}", s)
    }
}

/// A registered command. Descriptors are built once at startup and shared.
pub trait CommandT: Send + Sync {
    fn id(&self) -> &str;
    /// Canonical name typed after the prefix.
    fn command(&self) -> &str;
    /// Human readable name shown in help listings.
    fn name(&self) -> &str;
    fn category(&self) -> Category;

    fn can_run_without_action(&self) -> bool { false }
    fn experimental(&self) -> bool { false }
    fn is_complex_command(&self) -> bool { false }

    /// Nested registry for commands that take a sub-action as their second token.
    fn actions(&self) -> Option<&CommandMap> { None }

    fn run(&self, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<Option<CommandResponse>>>;
    fn help(&self, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<Reply>>;
}

#[derive(Debug, Clone)]
pub struct CommandInfo {
    pub id: String,
    pub command: String,
    pub name: String,
    pub category: Category,
    pub can_run_without_action: bool,
    pub experimental: bool,
    pub is_complex_command: bool,
}

impl CommandInfo {
    pub fn new(command: impl Into<String>, name: impl Into<String>, category: Category) -> Self {
        let command = command.into();
        Self {
            id: command.clone(),
            command,
            name: name.into(),
            category,
            can_run_without_action: false,
            experimental: false,
            is_complex_command: false,
        }
    }

    pub fn runs_without_action(mut self) -> Self {
        self.can_run_without_action = true;
        self
    }

    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    pub fn complex(mut self) -> Self {
        self.is_complex_command = true;
        self
    }
}

pub struct FnCommand<F, H> {func: F, help: H, info: CommandInfo} impl<F, H> FnCommand<F, H>
    where
        F: Fn(ChatEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<Option<CommandResponse>>> + Send + Sync + 'static,
        H: Fn(ChatEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<Reply>> + Send + Sync + 'static {
    pub fn new(info: CommandInfo, func: F, help: H) -> Self {
        Self { func, help, info }
    }
}

impl<F, H> CommandT for FnCommand<F, H> where
    F: Fn(ChatEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<Option<CommandResponse>>> + Send + Sync + 'static,
    H: Fn(ChatEvent, Arc<AppState>) -> BoxFuture<'static, BotResult<Reply>> + Send + Sync + 'static {
        fn run(&self, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<Option<CommandResponse>>> {
            (self.func)(event, state)
        }

        fn help(&self, event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<Reply>> {
            (self.help)(event, state)
        }

        fn id(&self) -> &str { &self.info.id }
        fn command(&self) -> &str { &self.info.command }
        fn name(&self) -> &str { &self.info.name }
        fn category(&self) -> Category { self.info.category }
        fn can_run_without_action(&self) -> bool { self.info.can_run_without_action }
        fn experimental(&self) -> bool { self.info.experimental }
        fn is_complex_command(&self) -> bool { self.info.is_complex_command }
}

#[macro_export]
macro_rules! cmd {
    ($command:expr $(, $alias:expr)* $(,)?) => {
        $crate::bot::commands::CommandRegistration {
            aliases: vec![$($alias.to_string()),*],
            command: $command,
        }
    };
}
