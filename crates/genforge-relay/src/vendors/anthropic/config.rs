use std::time::Duration;

use crate::errors::RelayError;

/// Configuration for the Anthropic upstream client.
#[derive(Clone, Debug)]
pub struct AnthropicConfig {
    /// API key sent in the `x-api-key` header.
    pub api_key: String,
    /// Base URL for the Anthropic-compatible endpoint.
    ///
    /// Useful for proxies or local test servers.
    pub base_url: String,
    /// Default HTTP timeout for requests.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Creates a config with sensible defaults and a provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Builds a config from `ANTHROPIC_API_KEY`.
    ///
    /// A missing key is a synchronous configuration failure; it never
    /// reaches the streaming phase.
    pub fn from_env() -> Result<Self, RelayError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "missing ANTHROPIC_API_KEY for Anthropic upstream".into(),
            ));
        }
        Ok(Self::new(api_key))
    }

    /// Overrides the API base URL (for proxies or test servers).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the default HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_tolerates_trailing_slash() {
        let config = AnthropicConfig::new("k").base_url("http://localhost:8099/");
        assert_eq!(config.messages_url(), "http://localhost:8099/v1/messages");
    }
}
