use crate::bot::response::{compose::{colors, compose_embed_message, EmbedOptions, VERTICAL_BAR}, emoji::get_emoji, response::Reply};

pub struct Replies;

impl Replies {
    pub fn inactivity(user_tag: &str) -> String {
        format!("> **{} {} {}, the command was closed due to inactivity.**", get_emoji("revoke"), VERTICAL_BAR, user_tag)
    }

    pub fn generic_error() -> Reply {
        Reply::embed(compose_embed_message(None, EmbedOptions {
            title: Some("Error".to_string()),
            description: Some("Something went wrong while running this command. Please try again later.".to_string()),
            color: Some(colors::ERROR),
            ..Default::default()
        }))
    }

    pub fn guild_only() -> Reply {
        Reply::embed(compose_embed_message(None, EmbedOptions {
            description: Some("This command can only be used inside a server.".to_string()),
            color: Some(colors::ERROR),
            ..Default::default()
        }))
    }

    pub fn no_invites() -> String {
        "No invites have been created in this server yet.".to_string()
    }

    pub fn invite_created(url: &str) -> String {
        format!("Here is your invite link: {url}")
    }

    pub fn coin_not_found(query: &str) -> String {
        format!("Couldn't find any token matching `{query}`.")
    }
}
