use std::fmt;

use chrono::{DateTime, Utc};

use crate::bot::choice::choice::ChoiceOptions;

/// Outbound display payload, independent of the chat library's builders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub files: Vec<Attachment>,
    pub components: Vec<ComponentRow>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Reply { content: Some(content.into()), ..Default::default() }
    }

    pub fn embed(embed: Embed) -> Self {
        Reply { embeds: vec![embed], ..Default::default() }
    }

    pub fn select_menu(&self) -> Option<&SelectMenu> {
        self.components.iter().find_map(|row| match row {
            ComponentRow::SelectMenu(menu) => Some(menu),
            ComponentRow::Buttons(_) => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub author: Option<EmbedAuthor>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub fields: Vec<EmbedField>,
    pub footer: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Embed {
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField { name: name.into(), value: value.into(), inline });
        self
    }

    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Clone, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("bytes", &self.data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentRow {
    SelectMenu(SelectMenu),
    Buttons(Vec<Button>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectMenu {
    pub custom_id: String,
    pub placeholder: Option<String>,
    pub options: Vec<SelectOption>,
}

impl SelectMenu {
    pub fn default_option(&self) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.default)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub custom_id: String,
    pub label: String,
    pub emoji: Option<String>,
}

/// What a run-handler or choice handler hands back: the payload plus an
/// optional choice registration to arm on the message carrying it.
pub struct CommandResponse {
    pub reply: Reply,
    pub choice: Option<ChoiceOptions>,
}

impl CommandResponse {
    pub fn new(reply: Reply) -> Self {
        CommandResponse { reply, choice: None }
    }

    pub fn with_choice(mut self, choice: ChoiceOptions) -> Self {
        self.choice = Some(choice);
        self
    }
}

impl From<Reply> for CommandResponse {
    fn from(reply: Reply) -> Self {
        CommandResponse::new(reply)
    }
}
