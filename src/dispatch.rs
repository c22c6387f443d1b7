use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::message::Payload;

/// A response from the endpoint, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

/// No response arrived: DNS, connect, TLS or timeout failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Webhook transport failed: {0}")]
pub struct TransportError(pub String);

/// Posts a payload to a webhook URL. The only I/O the core depends on.
#[async_trait(?Send)]
pub trait Transport {
    async fn post(&self, url: &str, payload: &Payload) -> Result<Reply, TransportError>;
}

/// A payload frozen at the moment the user pressed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    pub url: String,
    pub payload: Payload,
}

impl DispatchRequest {
    pub async fn send<T: Transport + ?Sized>(&self, transport: &T) -> Outcome {
        Outcome::classify(transport.post(&self.url, &self.payload).await)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Delivered { status: u16 },
    Rejected { status: u16, body: String },
    TransportFailure { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Success,
    Error,
}

/// What the user gets told.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub message: String,
    pub severity: Severity,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

impl Outcome {
    pub fn classify(result: Result<Reply, TransportError>) -> Self {
        let outcome = match result {
            Ok(Reply { status, .. }) if (200..300).contains(&status) => Self::Delivered { status },
            Ok(Reply { status, body }) => Self::Rejected { status, body },
            Err(TransportError(reason)) => Self::TransportFailure { reason },
        };
        match &outcome {
            Self::Delivered { status } => info!(status, "embed delivered"),
            Self::Rejected { status, body } => warn!(status, %body, "webhook rejected embed"),
            Self::TransportFailure { reason } => warn!(%reason, "webhook unreachable"),
        }
        outcome
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Rejections and transport failures read the same to the user.
    pub fn status(&self) -> Status {
        match self {
            Self::Delivered { .. } => Status::success("Embed sent successfully!"),
            Self::Rejected { .. } | Self::TransportFailure { .. } => {
                Status::error("Failed to send embed")
            }
        }
    }
}
