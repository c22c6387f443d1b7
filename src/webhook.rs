use async_trait::async_trait;
use reqwest::header;
use tracing::{debug, warn};

use crate::config::Config;
use crate::dispatch::{Reply, Transport, TransportError};
use crate::error;
use crate::message::Payload;

/// reqwest-backed [`Transport`]. Works natively and inside the worker runtime.
pub struct Client {
    client: reqwest::Client,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let builder = reqwest::Client::builder().default_headers(Self::headers(config)?);
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        let client = builder
            .build()
            .map_err(|err| TransportError(err.to_string()))?;
        Ok(Self { client })
    }

    fn headers(config: &Config) -> Result<header::HeaderMap, TransportError> {
        let agent = header::HeaderValue::from_str(&config.user_agent)
            .map_err(|err| TransportError(format!("invalid user agent: {err}")))?;
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, agent);
        Ok(headers)
    }
}

#[async_trait(?Send)]
impl Transport for Client {
    async fn post(&self, url: &str, payload: &Payload) -> Result<Reply, TransportError> {
        debug!(url, "posting embed");
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|err| TransportError(err.to_string()))?;
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                warn!(%err, status, "could not read webhook response body");
                String::new()
            }
        };
        Ok(Reply { status, body })
    }
}

/// A webhook URL must be an absolute http(s) URL before anything is sent.
pub fn parse_url(raw: &str) -> Result<url::Url, error::General> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(error::General::PayloadEmpty);
    }
    match url::Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(parsed)
        }
        _ => Err(error::General::InvalidWebhookUrl(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_url_means_nothing_to_send() {
        assert!(matches!(parse_url(""), Err(error::General::PayloadEmpty)));
        assert!(matches!(parse_url("  "), Err(error::General::PayloadEmpty)));
    }

    #[test]
    fn only_absolute_http_urls_pass() {
        assert!(parse_url("https://discord.com/api/webhooks/1/abc").is_ok());
        assert!(parse_url("http://localhost:8080/hook").is_ok());
        for raw in ["discord.com/api/webhooks", "ftp://example.com/x", "mailto:a@b.c"] {
            assert!(
                matches!(parse_url(raw), Err(error::General::InvalidWebhookUrl(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn client_builds_with_defaults() {
        assert!(Client::new(&Config::default()).is_ok());
    }

    #[test]
    fn unusable_user_agent_is_refused() {
        let config = Config::default().user_agent("embedhook\n/1.0");
        assert!(matches!(
            Client::new(&config),
            Err(TransportError(reason)) if reason.starts_with("invalid user agent")
        ));
    }
}
