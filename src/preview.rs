//! Projection of an embed into the layout the chat client would draw.
//!
//! The tree is plain data. Identical input always gives an identical tree; the
//! only environment input is the viewer's UTC offset, fixed when the
//! [`Projector`] is built.

use chrono::FixedOffset;
use serde::Serialize;

use crate::embed::{Embed, EmbedField};
use crate::message::SenderIdentity;
use crate::validate::{self, Color, Timestamp};

/// Border color used when the embed has none.
pub const DEFAULT_ACCENT: u32 = 0x4F_54_5C;
pub const GRID_COLUMNS: usize = 3;
pub const FOOTER_SEPARATOR: &str = " • ";

const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<SenderLine>,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// `#rrggbb`
    pub accent: String,
    /// Floated beside the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub body: Vec<Block>,
}

/// Sections of the card body, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Author {
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        name: Label,
    },
    Title {
        text: Label,
    },
    Description {
        text: String,
    },
    Fields {
        rows: Vec<Row>,
    },
    Image {
        url: String,
    },
    Footer {
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Label {
    Plain(String),
    Link { text: String, href: String },
}

impl Label {
    fn new(text: &str, href: Option<&str>) -> Self {
        match href {
            Some(href) => Self::Link {
                text: text.to_string(),
                href: href.to_string(),
            },
            None => Self::Plain(text.to_string()),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) | Self::Link { text, .. } => text,
        }
    }
}

/// One line of the field grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "cells", rename_all = "snake_case")]
pub enum Row {
    /// Up to [`GRID_COLUMNS`] inline fields, left to right.
    Inline(Vec<Cell>),
    /// A single non-inline field spanning every column.
    Full(Cell),
}

impl Row {
    pub fn cells(&self) -> &[Cell] {
        match self {
            Self::Inline(cells) => cells,
            Self::Full(cell) => std::slice::from_ref(cell),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub name: String,
    pub value: String,
}

impl From<&EmbedField> for Cell {
    fn from(field: &EmbedField) -> Self {
        Self {
            name: field.name.clone(),
            value: field.value.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projector {
    offset: FixedOffset,
}

impl Projector {
    pub fn with_offset(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn local() -> Self {
        Self::with_offset(validate::local_offset())
    }

    pub fn project(&self, embed: &Embed, identity: &SenderIdentity) -> Preview {
        let mut body = Vec::new();

        if let Some(author) = &embed.author {
            if let Some(name) = present(&author.name) {
                body.push(Block::Author {
                    icon: present(&author.icon_url).map(str::to_string),
                    name: Label::new(name, present(&author.url)),
                });
            }
        }
        if let Some(title) = present(&embed.title) {
            body.push(Block::Title {
                text: Label::new(title, present(&embed.url)),
            });
        }
        if let Some(description) = present(&embed.description) {
            body.push(Block::Description {
                text: description.to_string(),
            });
        }
        if !embed.fields.is_empty() {
            body.push(Block::Fields {
                rows: grid(&embed.fields),
            });
        }
        if let Some(url) = embed.image.as_ref().and_then(|image| present(&image.url)) {
            body.push(Block::Image {
                url: url.to_string(),
            });
        }
        if let Some(footer) = self.footer(embed) {
            body.push(footer);
        }

        Preview {
            sender: sender(identity),
            card: Card {
                accent: embed.color.map_or_else(default_accent, Color::to_css),
                thumbnail: embed
                    .thumbnail
                    .as_ref()
                    .and_then(|thumbnail| present(&thumbnail.url))
                    .map(str::to_string),
                body,
            },
        }
    }

    /// The stored instant in the viewer's offset.
    pub fn local_time(&self, timestamp: &Timestamp) -> String {
        timestamp
            .instant()
            .with_timezone(&self.offset)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    fn footer(&self, embed: &Embed) -> Option<Block> {
        let footer = embed.footer.as_ref();
        let text = footer.and_then(|footer| present(&footer.text));
        let time = embed.timestamp.as_ref().map(|stamp| self.local_time(stamp));
        let line = match (text, time) {
            (None, None) => return None,
            (Some(text), None) => text.to_string(),
            (None, Some(time)) => time,
            (Some(text), Some(time)) => format!("{text}{FOOTER_SEPARATOR}{time}"),
        };
        Some(Block::Footer {
            icon: footer
                .and_then(|footer| present(&footer.icon_url))
                .map(str::to_string),
            text: line,
        })
    }
}

/// Projects with the viewer's local offset.
pub fn project(embed: &Embed, identity: &SenderIdentity) -> Preview {
    Projector::local().project(embed, identity)
}

/// Inline fields share rows of up to three; a non-inline field closes the current row
/// and takes a row of its own.
pub fn grid(fields: &[EmbedField]) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut current: Vec<Cell> = Vec::with_capacity(GRID_COLUMNS);
    for field in fields {
        if field.inline {
            current.push(Cell::from(field));
            if current.len() == GRID_COLUMNS {
                rows.push(Row::Inline(std::mem::take(&mut current)));
            }
        } else {
            if !current.is_empty() {
                rows.push(Row::Inline(std::mem::take(&mut current)));
            }
            rows.push(Row::Full(Cell::from(field)));
        }
    }
    if !current.is_empty() {
        rows.push(Row::Inline(current));
    }
    rows
}

fn sender(identity: &SenderIdentity) -> Option<SenderLine> {
    let avatar = present(&identity.avatar_url).map(str::to_string);
    let name = present(&identity.username).map(str::to_string);
    (avatar.is_some() || name.is_some()).then_some(SenderLine { avatar, name })
}

fn default_accent() -> String {
    format!("#{DEFAULT_ACCENT:06x}")
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
