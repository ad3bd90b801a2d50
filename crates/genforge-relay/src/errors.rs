use crate::upstream::ProviderId;

/// Errors surfaced by an upstream client while opening or reading a
/// completion stream. Once the outbound stream has started these are
/// converted into a terminal `error` wire event, never propagated as a
/// raw failure across the relay boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// Provider returned an application-level failure (HTTP status, auth, quota).
    #[error("provider error ({provider}): {message}")]
    Provider {
        provider: ProviderId,
        message: String,
        status_code: Option<u16>,
    },
    /// Network or stream I/O failed.
    #[error("transport error ({provider}): {message}")]
    Transport {
        provider: ProviderId,
        message: String,
    },
    /// Provider response shape or event sequencing was invalid.
    #[error("protocol error ({provider}): {message}")]
    Protocol {
        provider: ProviderId,
        message: String,
    },
}

impl UpstreamError {
    /// Creates a provider-level error.
    pub fn provider(
        provider: impl Into<ProviderId>,
        message: impl Into<String>,
        status_code: Option<u16>,
    ) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
            status_code,
        }
    }

    /// Creates a transport-level error.
    pub fn transport(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(provider: impl Into<ProviderId>, message: impl Into<String>) -> Self {
        Self::Protocol {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Provider { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. } => message,
        }
    }
}

/// Top-level error type for the public relay API.
///
/// These are the synchronous, pre-stream failures: once `generate`
/// returns a stream, failures degrade to wire events instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// Missing or invalid upstream credentials/configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Invalid generation request input.
    #[error("validation error: {0}")]
    Validation(String),
    /// Upstream failure surfaced outside a started stream.
    #[error(transparent)]
    Upstream(UpstreamError),
}
