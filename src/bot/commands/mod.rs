use std::{collections::{BTreeMap, HashMap}, sync::Arc};

use crate::bot::{commands::commands::{BotResult, Category, CommandT, COMMAND_GROUPS}, state::def::BotError};

pub mod commands;
pub mod community;
pub mod config;
pub mod defi;

#[derive(Clone)]
pub struct CommandRegistration {
    pub aliases: Vec<String>,
    pub command: Arc<dyn CommandT>
}

pub struct CommandGroup {
    pub name: String,
    pub commands: Vec<CommandRegistration>,
}

pub struct CommandRegistry {
    pub groups: Vec<Arc<CommandGroup>>,
    pub commands: CommandMap,
}

pub type CommandMap = HashMap<String, Arc<dyn CommandT>>;

/// Maps every canonical name and alias to its descriptor. A name claimed by two
/// registrations is rejected.
pub fn build_command_map(registrations: &[CommandRegistration]) -> BotResult<CommandMap> {
    let mut map: CommandMap = HashMap::new();

    for reg in registrations {
        let names = std::iter::once(reg.command.command().to_string()).chain(reg.aliases.iter().cloned());

        for name in names {
            if let Some(existing) = map.get(&name) {
                if Arc::ptr_eq(existing, &reg.command) {
                    continue;
                }
                return Err(BotError::DuplicateAlias(name));
            }
            map.insert(name, reg.command.clone());
        }
    }

    Ok(map)
}

impl CommandRegistry {
    pub fn new() -> BotResult<Self> {
        Self::from_groups(COMMAND_GROUPS.iter().cloned().collect())
    }

    pub fn from_groups(groups: Vec<Arc<CommandGroup>>) -> BotResult<Self> {
        let registrations: Vec<CommandRegistration> = groups
            .iter()
            .flat_map(|g| g.commands.iter().cloned())
            .collect();
        let commands = build_command_map(&registrations)?;

        Ok(Self { groups, commands })
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn CommandT>> {
        self.commands.get(name).cloned()
    }

    /// Non-experimental commands grouped by category, each listed once.
    pub fn by_category(&self) -> BTreeMap<Category, Vec<Arc<dyn CommandT>>> {
        let mut listed: BTreeMap<Category, Vec<Arc<dyn CommandT>>> = BTreeMap::new();

        for reg in self.groups.iter().flat_map(|g| g.commands.iter()) {
            if reg.command.experimental() {
                continue;
            }
            listed.entry(reg.command.category()).or_default().push(reg.command.clone());
        }

        listed
    }
}
