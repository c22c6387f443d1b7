use std::fmt;

use crate::error;

/// Rejected user input. The model keeps its prior value whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Validation {
    #[error("'{0}' is not a 6 digit hex color.")]
    InvalidColor(String),

    #[error("'{0}' is not a date and time.")]
    InvalidTimestamp(String),

    #[error("An embed can hold at most {0} fields.")]
    FieldLimit(usize),

    #[error("There is no field at position {0}.")]
    NoSuchField(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum General {
    #[error("Please enter a webhook URL")]
    PayloadEmpty,

    #[error("Webhook URL '{0}' is not a valid http(s) URL.")]
    InvalidWebhookUrl(String),

    #[error("Failed to deserialize from or serialize to JSON.")]
    JsonFailed(#[from] serde_json::Error),

    #[error("Invalid payload provided: {0}.")]
    InvalidPayload(String),

    #[cfg(target_arch = "wasm32")]
    #[error("Worker error: {0}.")]
    Worker(#[from] worker::Error),
}

#[derive(Debug)]
pub struct Http {
    pub status: Status,
    pub reason: General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    BadRequest = 400,
    InternalServerError = 500,
}

impl fmt::Display for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "An HTTP error occurred: {}", self.reason)
    }
}

impl From<General> for Http {
    fn from(error: General) -> Self {
        Self {
            status: match &error {
                error::General::PayloadEmpty
                | error::General::InvalidWebhookUrl(_)
                | error::General::JsonFailed(_)
                | error::General::InvalidPayload(_) => Status::BadRequest,
                #[cfg(target_arch = "wasm32")]
                error::General::Worker(_) => Status::InternalServerError,
            },
            reason: error,
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl From<worker::Error> for Http {
    fn from(error: worker::Error) -> Self {
        Self::from(error::General::from(error))
    }
}
