//! REST client configuration

use std::time::Duration;

/// Configuration for the Discord REST client
#[derive(Clone)]
pub struct DiscordHttpConfig {
    /// Base URL without trailing slash (default: `https://discord.com/api/v10`)
    pub api_base: String,
    /// Bot token, sent as `Authorization: Bot <token>`
    pub token: String,
    /// Timeout for every request (default: 15 seconds)
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl DiscordHttpConfig {
    /// Default settings for a bot token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            api_base: "https://discord.com/api/v10".to_string(),
            token: token.into(),
            request_timeout: Duration::from_secs(15),
            user_agent: format!("DiscordBot (refcord, {})", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Point the client at another base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }
}

impl From<&refcord_common::DiscordConfig> for DiscordHttpConfig {
    fn from(config: &refcord_common::DiscordConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            ..Self::new(config.token.clone()).with_api_base(config.api_base.clone())
        }
    }
}

impl std::fmt::Debug for DiscordHttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordHttpConfig")
            .field("api_base", &self.api_base)
            .field("token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}
