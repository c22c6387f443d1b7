use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Validation;
use crate::validate::{self, Color, Timestamp};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<MediaRef>,
    #[serde(default)]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Shared by `image` and `thumbnail`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A top-level scalar edit, carrying the raw input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarEdit {
    Title(String),
    Description(String),
    Url(String),
    Color(String),
    /// Local date-time in `offset`, as a `datetime-local` input produces it.
    Timestamp { raw: String, offset: FixedOffset },
}

impl ScalarEdit {
    /// A timestamp typed in the viewer's own time zone.
    pub fn local_timestamp(raw: impl Into<String>) -> Self {
        Self::Timestamp {
            raw: raw.into(),
            offset: validate::local_offset(),
        }
    }
}

/// Partial update of one sub-object. `Some(raw)` sets a key (blank clears it),
/// `None` leaves it alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubObjectUpdate {
    Author {
        name: Option<String>,
        url: Option<String>,
        icon_url: Option<String>,
    },
    Footer {
        text: Option<String>,
        icon_url: Option<String>,
    },
    Image {
        url: Option<String>,
    },
    Thumbnail {
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldUpdate {
    pub name: Option<String>,
    pub value: Option<String>,
    pub inline: Option<bool>,
}

impl Embed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies one scalar edit. On rejection the previous value is kept.
    pub fn set_scalar(&mut self, edit: ScalarEdit) -> Result<(), Validation> {
        match edit {
            ScalarEdit::Title(raw) => self.title = validate::text(&raw, validate::TITLE_LIMIT),
            ScalarEdit::Description(raw) => {
                self.description = validate::text(&raw, validate::DESCRIPTION_LIMIT)
            }
            ScalarEdit::Url(raw) => self.url = validate::url(&raw),
            ScalarEdit::Color(raw) => {
                self.color = validate::color(&raw).map_err(|err| {
                    warn!(%err, "keeping previous color");
                    err
                })?
            }
            ScalarEdit::Timestamp { raw, offset } => {
                self.timestamp = validate::timestamp(&raw, &offset).map_err(|err| {
                    warn!(%err, "keeping previous timestamp");
                    err
                })?
            }
        }
        Ok(())
    }

    /// Merges into the named sub-object, creating it if needed. A sub-object left with
    /// no keys is dropped.
    pub fn set_sub_object(&mut self, update: SubObjectUpdate) {
        match update {
            SubObjectUpdate::Author {
                name,
                url,
                icon_url,
            } => {
                let mut author = self.author.take().unwrap_or_default();
                if let Some(raw) = name {
                    author.name = validate::text(&raw, validate::AUTHOR_NAME_LIMIT);
                }
                if let Some(raw) = url {
                    author.url = validate::url(&raw);
                }
                if let Some(raw) = icon_url {
                    author.icon_url = validate::url(&raw);
                }
                self.author = (author != Author::default()).then_some(author);
            }
            SubObjectUpdate::Footer { text, icon_url } => {
                let mut footer = self.footer.take().unwrap_or_default();
                if let Some(raw) = text {
                    footer.text = validate::text(&raw, validate::FOOTER_TEXT_LIMIT);
                }
                if let Some(raw) = icon_url {
                    footer.icon_url = validate::url(&raw);
                }
                self.footer = (footer != Footer::default()).then_some(footer);
            }
            SubObjectUpdate::Image { url } => {
                if let Some(raw) = url {
                    self.image = MediaRef::from_raw(&raw);
                }
            }
            SubObjectUpdate::Thumbnail { url } => {
                if let Some(raw) = url {
                    self.thumbnail = MediaRef::from_raw(&raw);
                }
            }
        }
    }

    /// Appends an empty, full-width field and returns its index.
    pub fn add_field(&mut self) -> Result<usize, Validation> {
        if self.fields.len() >= validate::FIELD_COUNT_LIMIT {
            debug!(count = self.fields.len(), "field limit reached");
            return Err(Validation::FieldLimit(validate::FIELD_COUNT_LIMIT));
        }
        self.fields.push(EmbedField::default());
        Ok(self.fields.len() - 1)
    }

    /// Removes the field at `index`; out of range is a no-op.
    pub fn remove_field(&mut self, index: usize) -> Option<EmbedField> {
        (index < self.fields.len()).then(|| self.fields.remove(index))
    }

    pub fn update_field(&mut self, index: usize, update: FieldUpdate) -> Result<(), Validation> {
        let field = self
            .fields
            .get_mut(index)
            .ok_or(Validation::NoSuchField(index))?;
        if let Some(raw) = update.name {
            field.name = validate::truncate(&raw, validate::FIELD_NAME_LIMIT);
        }
        if let Some(raw) = update.value {
            field.value = validate::truncate(&raw, validate::FIELD_VALUE_LIMIT);
        }
        if let Some(inline) = update.inline {
            field.inline = inline;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Re-applies every cap and blank rule, for embeds that did not come through the
    /// edit operations.
    pub fn normalized(self) -> Self {
        let text = |value: Option<String>, limit| value.and_then(|raw| validate::text(&raw, limit));
        let url = |value: Option<String>| value.and_then(|raw| validate::url(&raw));

        let author = self.author.map(|author| Author {
            name: text(author.name, validate::AUTHOR_NAME_LIMIT),
            url: url(author.url),
            icon_url: url(author.icon_url),
        });
        let footer = self.footer.map(|footer| Footer {
            text: text(footer.text, validate::FOOTER_TEXT_LIMIT),
            icon_url: url(footer.icon_url),
        });
        let mut fields = self.fields;
        if fields.len() > validate::FIELD_COUNT_LIMIT {
            warn!(count = fields.len(), "dropping fields past the limit");
            fields.truncate(validate::FIELD_COUNT_LIMIT);
        }

        Self {
            title: text(self.title, validate::TITLE_LIMIT),
            description: text(self.description, validate::DESCRIPTION_LIMIT),
            url: url(self.url),
            color: self.color,
            timestamp: self.timestamp,
            author: author.filter(|author| *author != Author::default()),
            footer: footer.filter(|footer| *footer != Footer::default()),
            image: self.image.and_then(|media| MediaRef::from_raw(media.url.as_deref()?)),
            thumbnail: self
                .thumbnail
                .and_then(|media| MediaRef::from_raw(media.url.as_deref()?)),
            fields: fields
                .into_iter()
                .map(|field| EmbedField {
                    name: validate::truncate(&field.name, validate::FIELD_NAME_LIMIT),
                    value: validate::truncate(&field.value, validate::FIELD_VALUE_LIMIT),
                    inline: field.inline,
                })
                .collect(),
        }
    }

    /// Characters that count towards the platform's per-embed total.
    pub fn character_count(&self) -> usize {
        let count = |value: Option<&String>| value.map_or(0, |text| text.chars().count());
        count(self.title.as_ref())
            + count(self.description.as_ref())
            + count(self.author.as_ref().and_then(|author| author.name.as_ref()))
            + count(self.footer.as_ref().and_then(|footer| footer.text.as_ref()))
            + self
                .fields
                .iter()
                .map(|field| field.name.chars().count() + field.value.chars().count())
                .sum::<usize>()
    }
}

impl MediaRef {
    fn from_raw(raw: &str) -> Option<Self> {
        validate::url(raw).map(|url| Self { url: Some(url) })
    }
}
