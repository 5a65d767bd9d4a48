use chrono::Utc;

use crate::bot::{chat_event::chat_event::ChatEvent, response::{emoji::get_emoji, response::{Button, ComponentRow, Embed, EmbedAuthor, Reply, SelectMenu, SelectOption}}};

pub const DOT: &str = "•";
pub const VERTICAL_BAR: &str = "|";
pub const EXIT_BUTTON_ID: &str = "exit";

pub mod colors {
    pub const PRIMARY: u32 = 0xE88B88;
    pub const ERROR: u32 = 0xD73833;
}

pub mod thumbnails {
    pub const HELP: &str = "https://i.imgur.com/uuQhOmH.png";
    pub const TOKENS: &str = "https://i.imgur.com/hcqO0Wu.png";
    pub const INVITE: &str = "https://cdn.discordapp.com/emojis/900748086513639454.png?size=240";
    pub const LOADING: &str = "https://cdn.discordapp.com/attachments/895993366960017491/933427920817492028/loading.gif";
}

#[derive(Debug, Clone, Default)]
pub struct EmbedOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub color: Option<u32>,
    pub author: Option<(String, Option<String>)>,
    pub footer: Vec<String>,
    pub usage: Option<String>,
    pub without_footer: bool,
}

/// Builds the standard embed: primary colour, footer with the requester, timestamp.
pub fn compose_embed_message(event: Option<&ChatEvent>, options: EmbedOptions) -> Embed {
    let mut embed = Embed {
        title: options.title,
        description: options.description,
        color: Some(options.color.unwrap_or(colors::PRIMARY)),
        author: options.author.map(|(name, icon_url)| EmbedAuthor { name, icon_url }),
        thumbnail: options.thumbnail,
        image: options.image,
        ..Default::default()
    };

    if let Some(usage) = options.usage {
        embed = embed.field("_Usage_", format!("`{usage}`"), false);
    }

    if !options.without_footer {
        let mut footer = options.footer;
        if let Some(event) = event {
            footer.push(format!("Requested by {}", event.user.tag));
        }
        if !footer.is_empty() {
            embed.footer = Some(get_embed_footer(&footer));
        }
        embed.timestamp = Some(Utc::now());
    }

    embed
}

pub fn get_help_embed(title: impl Into<String>) -> Embed {
    compose_embed_message(None, EmbedOptions {
        title: Some(title.into()),
        thumbnail: Some(thumbnails::HELP.to_string()),
        ..Default::default()
    })
}

pub fn get_embed_footer(texts: &[String]) -> String {
    texts.join(&format!(" {DOT} "))
}

pub fn get_header(text: &str, user_tag: &str, ctas: Option<&str>) -> String {
    let ctas = match ctas {
        Some(c) if !c.is_empty() => format!(" {DOT}{c}"),
        _ => String::new(),
    };
    format!("> **{text} {DOT} [** {user_tag} **]{ctas}**")
}

pub fn compose_discord_selection_row(custom_id: impl Into<String>, placeholder: impl Into<String>, options: Vec<SelectOption>) -> ComponentRow {
    ComponentRow::SelectMenu(SelectMenu {
        custom_id: custom_id.into(),
        placeholder: Some(placeholder.into()),
        options,
    })
}

pub fn compose_discord_exit_button() -> ComponentRow {
    ComponentRow::Buttons(vec![Button {
        custom_id: EXIT_BUTTON_ID.to_string(),
        label: "Exit".to_string(),
        emoji: Some("❌".to_string()),
    }])
}

pub fn work_in_progress(event: &ChatEvent) -> Reply {
    Reply::embed(compose_embed_message(Some(event), EmbedOptions {
        title: Some("Work In Progress".to_string()),
        description: Some("This feature is still being built. Check back later!".to_string()),
        thumbnail: Some(thumbnails::LOADING.to_string()),
        ..Default::default()
    }))
}

/// `[(command, display name)]` rendered as the bold-name-then-reply-arrow list used in help embeds.
pub fn get_list_commands<'a>(prefix: &str, commands: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let emoji = match get_emoji("reply") {
        e if e.is_empty() => "╰ ".to_string(),
        e => e,
    };
    commands
        .into_iter()
        .map(|(command, name)| format!("**{prefix}{command}**\n{emoji}{name}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_includes_user_and_optional_ctas() {
        assert_eq!(get_header("View all supported tokens", "neko#0001", None), "> **View all supported tokens • [** neko#0001 **]**");
        assert_eq!(get_header("Hi", "neko", Some(" tip")), "> **Hi • [** neko **] • tip**");
        assert_eq!(get_header("Hi", "neko", Some("")), "> **Hi • [** neko **]**");
    }

    #[test]
    fn embed_defaults_to_primary_colour_and_usage_field() {
        let embed = compose_embed_message(None, EmbedOptions {
            usage: Some("!tokens".to_string()),
            footer: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        });
        assert_eq!(embed.color, Some(colors::PRIMARY));
        assert_eq!(embed.fields[0].value, "`!tokens`");
        assert_eq!(embed.footer.as_deref(), Some("a • b"));
        assert!(embed.timestamp.is_some());
    }

    #[test]
    fn without_footer_skips_footer_and_timestamp() {
        let embed = compose_embed_message(None, EmbedOptions { without_footer: true, ..Default::default() });
        assert!(embed.footer.is_none());
        assert!(embed.timestamp.is_none());
    }

    #[test]
    fn lists_commands_with_reply_emoji() {
        let listed = get_list_commands("!", [("getlink", "Get invite link"), ("list", "List invites")]);
        assert_eq!(listed, "**!getlink**\n<:reply:967285237983875122>Get invite link\n\n**!list**\n<:reply:967285237983875122>List invites");
    }
}
