use serenity::all::{ButtonStyle, ComponentInteraction, ComponentInteractionDataKind, CreateActionRow, CreateAttachment, CreateButton, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption, EditAttachments, EditMessage, Message, ReactionType, Timestamp, User};

use crate::bot::{chat_event::chat_event::{ChatEvent, ChatUser, InteractionEvent}, response::response::{Attachment, Button, ComponentRow, Embed, Reply, SelectMenu}};

fn map_user(user: &User) -> ChatUser {
    ChatUser {
        id: user.id,
        tag: user.tag(),
        bot: user.bot,
    }
}

pub fn map_message(msg: &Message) -> ChatEvent {
    ChatEvent {
        message_id: msg.id,
        channel_id: msg.channel_id,
        guild_id: msg.guild_id,
        user: map_user(&msg.author),
        message: msg.content.clone(),
    }
}

pub fn map_component(interaction: &ComponentInteraction) -> InteractionEvent {
    let values = match &interaction.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.clone(),
        _ => Vec::new(),
    };

    InteractionEvent {
        message_id: interaction.message.id,
        channel_id: interaction.channel_id,
        guild_id: interaction.guild_id,
        user: map_user(&interaction.user),
        custom_id: interaction.data.custom_id.clone(),
        values,
    }
}

pub fn to_create_message(reply: &Reply) -> CreateMessage {
    let mut builder = CreateMessage::new()
        .embeds(reply.embeds.iter().map(to_create_embed).collect())
        .components(reply.components.iter().map(to_action_row).collect())
        .add_files(reply.files.iter().map(to_attachment).collect::<Vec<_>>());

    if let Some(content) = &reply.content {
        builder = builder.content(content);
    }
    builder
}

/// Replaces the whole message. Attachments are only touched when the reply carries files.
pub fn to_edit_message(reply: &Reply) -> EditMessage {
    let mut builder = EditMessage::new()
        .content(reply.content.clone().unwrap_or_default())
        .embeds(reply.embeds.iter().map(to_create_embed).collect())
        .components(reply.components.iter().map(to_action_row).collect());

    if !reply.files.is_empty() {
        let attachments = reply.files.iter().fold(EditAttachments::new(), |acc, file| acc.add(to_attachment(file)));
        builder = builder.attachments(attachments);
    }
    builder
}

fn to_attachment(file: &Attachment) -> CreateAttachment {
    CreateAttachment::bytes(file.data.clone(), file.filename.clone())
}

pub fn to_create_embed(embed: &Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();

    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    if let Some(author) = &embed.author {
        let mut create_author = CreateEmbedAuthor::new(&author.name);
        if let Some(icon) = &author.icon_url {
            create_author = create_author.icon_url(icon);
        }
        builder = builder.author(create_author);
    }
    if let Some(thumbnail) = &embed.thumbnail {
        builder = builder.thumbnail(thumbnail);
    }
    if let Some(image) = &embed.image {
        builder = builder.image(image);
    }
    for field in &embed.fields {
        builder = builder.field(&field.name, &field.value, field.inline);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    if let Some(timestamp) = embed.timestamp.and_then(|t| Timestamp::from_unix_timestamp(t.timestamp()).ok()) {
        builder = builder.timestamp(timestamp);
    }

    builder
}

fn to_reaction(emoji: &str) -> Option<ReactionType> {
    ReactionType::try_from(emoji).ok()
}

fn to_action_row(row: &ComponentRow) -> CreateActionRow {
    match row {
        ComponentRow::SelectMenu(menu) => CreateActionRow::SelectMenu(to_select_menu(menu)),
        ComponentRow::Buttons(buttons) => CreateActionRow::Buttons(buttons.iter().map(to_button).collect()),
    }
}

fn to_select_menu(menu: &SelectMenu) -> CreateSelectMenu {
    let options = menu
        .options
        .iter()
        .map(|o| {
            let mut option = CreateSelectMenuOption::new(&o.label, &o.value).default_selection(o.default);
            if let Some(description) = &o.description {
                option = option.description(description);
            }
            if let Some(emoji) = o.emoji.as_deref().and_then(to_reaction) {
                option = option.emoji(emoji);
            }
            option
        })
        .collect();

    let mut builder = CreateSelectMenu::new(&menu.custom_id, CreateSelectMenuKind::String { options });
    if let Some(placeholder) = &menu.placeholder {
        builder = builder.placeholder(placeholder);
    }
    builder
}

fn to_button(button: &Button) -> CreateButton {
    let mut builder = CreateButton::new(&button.custom_id).label(&button.label).style(ButtonStyle::Secondary);
    if let Some(emoji) = button.emoji.as_deref().and_then(to_reaction) {
        builder = builder.emoji(emoji);
    }
    builder
}
