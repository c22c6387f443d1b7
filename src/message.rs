use serde::{Deserialize, Serialize};

use crate::embed::Embed;
use crate::error;
use crate::validate;

/// Who the message appears to come from. Supplied by the shell, not part of the embed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl SenderIdentity {
    pub fn new(username: &str, avatar_url: &str) -> Self {
        Self {
            username: validate::text(username, validate::USERNAME_LIMIT),
            avatar_url: validate::url(avatar_url),
        }
    }

    pub fn set_username(&mut self, raw: &str) {
        self.username = validate::text(raw, validate::USERNAME_LIMIT);
    }

    pub fn set_avatar_url(&mut self, raw: &str) {
        self.avatar_url = validate::url(raw);
    }

    fn normalized(self) -> Self {
        Self::new(
            self.username.as_deref().unwrap_or_default(),
            self.avatar_url.as_deref().unwrap_or_default(),
        )
    }
}

/// The JSON body posted to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub embeds: Vec<Embed>,
}

impl Payload {
    pub fn to_json(&self) -> Result<String, error::General> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(body: &str) -> Result<Self, error::General> {
        Ok(serde_json::from_str(body)?)
    }
}

pub fn serialize(embed: &Embed, identity: &SenderIdentity) -> Payload {
    Payload {
        username: identity.username.clone(),
        avatar_url: identity.avatar_url.clone(),
        embeds: vec![embed.clone()],
    }
}

/// Inverse of [`serialize`]. Only the first embed is kept; values are re-normalized.
pub fn deserialize(payload: Payload) -> Result<(Embed, SenderIdentity), error::General> {
    let identity = SenderIdentity {
        username: payload.username,
        avatar_url: payload.avatar_url,
    }
    .normalized();
    let embed = payload
        .embeds
        .into_iter()
        .next()
        .ok_or_else(|| error::General::InvalidPayload("no embed".into()))?
        .normalized();
    Ok((embed, identity))
}
