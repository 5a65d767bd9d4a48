use std::{collections::HashMap, sync::Arc};

use futures::future::BoxFuture;
use serenity::all::UserId;

use crate::bot::{chat_event::chat_event::ChatEvent, commands::{commands::{BotResult, Category, CommandInfo, CommandT, FnCommand}, CommandMap}, handler::handler::InviteSummary, replies::Replies, response::{compose::{compose_embed_message, get_help_embed, get_list_commands, thumbnails, EmbedOptions, DOT}, response::{CommandResponse, Reply}}, state::def::AppState};

const LEADERBOARD_SIZE: usize = 10;

/// Invite tracker. Every behaviour lives in a sub-action.
pub struct InviteCommand {
    info: CommandInfo,
    ordered: Vec<Arc<dyn CommandT>>,
    actions: CommandMap,
}

impl InviteCommand {
    pub fn new() -> Self {
        let ordered = vec![getlink_action(), list_action(), leaderboard_action()];
        let actions = ordered.iter().map(|a| (a.command().to_string(), a.clone())).collect();

        InviteCommand {
            info: CommandInfo::new("invite", "Invite", Category::Community),
            ordered,
            actions,
        }
    }

    fn help_listing(&self, prefix: &str) -> Reply {
        let listed = get_list_commands(
            &format!("{prefix}invite "),
            self.ordered.iter().map(|a| (a.command(), a.name())),
        );

        let mut embed = get_help_embed(format!("{prefix}invite")).thumbnail(thumbnails::INVITE);
        embed.description = Some(format!(
            "```Invite Tracker, tracks all your invites.```\n{listed}\n\n\nType `{prefix}help invite <action>` to learn more about a specific action!"
        ));
        Reply::embed(embed)
    }
}

impl CommandT for InviteCommand {
    fn id(&self) -> &str { &self.info.id }
    fn command(&self) -> &str { &self.info.command }
    fn name(&self) -> &str { &self.info.name }
    fn category(&self) -> Category { self.info.category }
    fn actions(&self) -> Option<&CommandMap> { Some(&self.actions) }

    fn run(&self, _event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<Option<CommandResponse>>> {
        let reply = self.help_listing(&state.config.prefix);
        Box::pin(async move { Ok(Some(CommandResponse::from(reply))) })
    }

    fn help(&self, _event: ChatEvent, state: Arc<AppState>) -> BoxFuture<'static, BotResult<Reply>> {
        let reply = self.help_listing(&state.config.prefix);
        Box::pin(async move { Ok(reply) })
    }
}

pub fn invite_command() -> Arc<dyn CommandT> {
    Arc::new(InviteCommand::new())
}

fn action_help(event: &ChatEvent, prefix: &str, action: &str, description: &str) -> Reply {
    Reply::embed(compose_embed_message(Some(event), EmbedOptions {
        thumbnail: Some(thumbnails::INVITE.to_string()),
        description: Some(description.to_string()),
        usage: Some(format!("{prefix}invite {action}")),
        ..Default::default()
    }))
}

fn getlink_action() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        CommandInfo::new("getlink", "Get the invite link of this channel", Category::Community),
        |event, state| Box::pin(async move {
            if event.guild_id.is_none() {
                return Ok(Some(CommandResponse::from(Replies::guild_only())));
            }
            let url = state.chat_client.create_invite(event.channel_id).await?;
            Ok(Some(CommandResponse::from(Reply::text(Replies::invite_created(&url)))))
        }),
        |event, state| Box::pin(async move {
            Ok(action_help(&event, &state.config.prefix, "getlink", "Create a permanent invite link for the current channel."))
        }),
    ))
}

fn list_action() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        CommandInfo::new("list", "List all invites of this server", Category::Community),
        |event, state| Box::pin(async move {
            let Some(guild_id) = event.guild_id else {
                return Ok(Some(CommandResponse::from(Replies::guild_only())));
            };
            let invites = state.chat_client.guild_invites(guild_id).await?;
            Ok(Some(CommandResponse::from(compose_invite_list(&event, &invites))))
        }),
        |event, state| Box::pin(async move {
            Ok(action_help(&event, &state.config.prefix, "list", "List every invite link of this server with its creator and uses."))
        }),
    ))
}

fn leaderboard_action() -> Arc<dyn CommandT> {
    Arc::new(FnCommand::new(
        CommandInfo::new("leaderboard", "Show the top inviters of this server", Category::Community),
        |event, state| Box::pin(async move {
            let Some(guild_id) = event.guild_id else {
                return Ok(Some(CommandResponse::from(Replies::guild_only())));
            };
            let invites = state.chat_client.guild_invites(guild_id).await?;
            Ok(Some(CommandResponse::from(compose_leaderboard(&event, &invites))))
        }),
        |event, state| Box::pin(async move {
            Ok(action_help(&event, &state.config.prefix, "leaderboard", "Show who brought the most members to this server."))
        }),
    ))
}

fn inviter_name(invite: &InviteSummary) -> String {
    invite.inviter_tag.clone().unwrap_or_else(|| "Unknown".to_string())
}

fn compose_invite_list(event: &ChatEvent, invites: &[InviteSummary]) -> Reply {
    if invites.is_empty() {
        return Reply::text(Replies::no_invites());
    }

    let description = invites
        .iter()
        .map(|i| format!("[`{}`]({}) {DOT} <#{}> {DOT} {} {DOT} {} uses", i.code, i.url, i.channel_id, inviter_name(i), i.uses))
        .collect::<Vec<_>>()
        .join("\n");

    Reply::embed(compose_embed_message(Some(event), EmbedOptions {
        author: Some(("Invite links".to_string(), None)),
        thumbnail: Some(thumbnails::INVITE.to_string()),
        description: Some(description),
        ..Default::default()
    }))
}

/// Total uses per inviter, highest first. Ties keep alphabetical order.
/// Inviters are grouped by user id and shown under the first tag seen.
pub fn rank_inviters(invites: &[InviteSummary]) -> Vec<(String, u64)> {
    let mut totals: HashMap<Option<UserId>, (String, u64)> = HashMap::new();
    for invite in invites {
        totals.entry(invite.inviter_id).or_insert_with(|| (inviter_name(invite), 0)).1 += invite.uses;
    }

    let mut ranked: Vec<(String, u64)> = totals.into_values().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(LEADERBOARD_SIZE);
    ranked
}

fn compose_leaderboard(event: &ChatEvent, invites: &[InviteSummary]) -> Reply {
    if invites.is_empty() {
        return Reply::text(Replies::no_invites());
    }

    let description = rank_inviters(invites)
        .iter()
        .enumerate()
        .map(|(i, (name, uses))| format!("**{}.** {name} {DOT} {uses} invites", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    Reply::embed(compose_embed_message(Some(event), EmbedOptions {
        author: Some(("Invite leaderboard".to_string(), None)),
        thumbnail: Some(thumbnails::INVITE.to_string()),
        description: Some(description),
        ..Default::default()
    }))
}
