//! Runtime settings for delivery and notifications.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Per-request timeout. Ignored on wasm, where the host runtime owns timeouts.
    pub timeout: Duration,

    /// User-Agent header for outgoing requests
    pub user_agent: String,

    /// How long a status notification stays visible
    pub notice_duration: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: format!("embedhook/{}", env!("CARGO_PKG_VERSION")),
            notice_duration: Duration::from_secs(3),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn notice_duration(mut self, duration: Duration) -> Self {
        self.notice_duration = duration;
        self
    }
}
