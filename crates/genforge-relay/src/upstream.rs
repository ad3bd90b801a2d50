use std::fmt;
use std::pin::Pin;

use crate::errors::UpstreamError;

/// Stable identifier for an upstream provider (for example `anthropic`).
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProviderId(pub String);

impl ProviderId {
    /// Creates a provider id from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the provider id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ProviderId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// One fully resolved streaming completion call.
///
/// Built by the relay from the user prompt plus injected configuration;
/// the model and token ceiling are never user input.
#[derive(Clone, Debug)]
pub struct CompletionRequest {
    /// Request id used for log correlation (not sent on the wire).
    pub request_id: uuid::Uuid,
    /// Static instructions describing the artifact output format.
    pub system_prompt: String,
    /// The user's prompt, sent as the sole message.
    pub user_prompt: String,
    /// Provider-specific model name.
    pub model: String,
    /// Ceiling on generated output tokens.
    pub max_output_tokens: u32,
}

/// Token-level event from an upstream client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpstreamEvent {
    /// Incremental text fragment.
    TextDelta { text: String },
    /// The upstream stream finished normally.
    Completed,
    /// An event shape the adapter does not recognize.
    ///
    /// The relay decides whether these are skipped or fatal via
    /// `RelayConfig::ignore_unrecognized_events`.
    Unrecognized { kind: String },
}

/// Boxed event stream plus any out-of-band response metadata.
pub struct UpstreamStreamHandle {
    /// Ordered upstream events, ending with `Completed` or stream close.
    pub stream:
        Pin<Box<dyn futures::Stream<Item = Result<UpstreamEvent, UpstreamError>> + Send + 'static>>,
}

/// Contract implemented by vendor upstream clients.
#[async_trait::async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Returns the stable provider id for this client.
    fn id(&self) -> ProviderId;

    /// Opens one streaming completion call.
    async fn start_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<UpstreamStreamHandle, UpstreamError>;
}
