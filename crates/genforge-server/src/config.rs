use std::env;
use std::time::Duration;

use genforge_relay::RelayConfig;

/// Loads `.env` into the process environment, if present.
pub fn init() {
    dotenvy::dotenv().ok();
}

/// Reads and parses an environment variable.
///
/// Unset variables yield `None`; unparsable values are logged and also
/// yield `None` so the caller's default applies.
pub fn get_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::error!("error parsing {key}, falling back to default");
                None
            }
        },
        Err(_) => None,
    }
}

/// Server settings resolved from the environment.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    /// TCP port to bind on localhost.
    pub port: u16,
    /// Optional model override for the relay.
    pub model: Option<String>,
    /// Optional output-token ceiling override.
    pub max_output_tokens: Option<u32>,
    /// Optional upstream idle timeout override, in seconds.
    pub idle_timeout_secs: Option<u64>,
}

impl ServerSettings {
    /// Resolves settings from `GENFORGE_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            port: get_env("GENFORGE_PORT").unwrap_or(4310),
            model: get_env("GENFORGE_MODEL"),
            max_output_tokens: get_env("GENFORGE_MAX_OUTPUT_TOKENS"),
            idle_timeout_secs: get_env("GENFORGE_IDLE_TIMEOUT_SECS"),
        }
    }

    /// Builds the relay configuration with any env overrides applied.
    pub fn relay_config(&self) -> RelayConfig {
        let mut config = RelayConfig::default();
        if let Some(model) = &self.model {
            config = config.model(model.clone());
        }
        if let Some(max) = self.max_output_tokens {
            config = config.max_output_tokens(max);
        }
        if let Some(secs) = self.idle_timeout_secs {
            config = config.idle_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let settings = ServerSettings {
            port: 4310,
            model: Some("claude-haiku-4-5".into()),
            max_output_tokens: None,
            idle_timeout_secs: Some(10),
        };
        let config = settings.relay_config();
        assert_eq!(config.model, "claude-haiku-4-5");
        assert_eq!(config.idle_timeout, Duration::from_secs(10));
        assert_eq!(
            config.max_output_tokens,
            RelayConfig::default().max_output_tokens
        );
    }
}
