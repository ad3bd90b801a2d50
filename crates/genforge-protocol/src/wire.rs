use crate::errors::ProtocolError;
use crate::sse::SseFrame;

/// A single message on the relay's outbound stream.
///
/// Ordering is significant: `CodeDelta` frames arrive in emission order
/// and exactly one terminal variant (`Done` or `Error`) closes the
/// stream.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    /// Incremental fragment of raw generated text.
    CodeDelta { content: String },
    /// Terminal success carrying the fully extracted artifact.
    Done { code: String },
    /// Terminal failure with a human-readable cause.
    Error { message: String },
}

impl WireEvent {
    /// Returns the SSE event name for this variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CodeDelta { .. } => "code_delta",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    /// True for `Done` and `Error`, which end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    /// Serializes this event as a complete SSE frame.
    pub fn to_sse(&self) -> String {
        let data = serde_json::to_string(self)
            .expect("WireEvent serialization should be infallible");
        format!("event: {}\ndata: {}\n\n", self.tag(), data)
    }

    /// Parses a decoded SSE frame back into a wire event.
    ///
    /// Frames without data (keep-alive pings, comments) yield `None`.
    pub fn from_sse_frame(frame: &SseFrame) -> Result<Option<Self>, ProtocolError> {
        let data = frame.data.trim();
        if data.is_empty() || data == "ping" {
            return Ok(None);
        }
        let event = serde_json::from_str::<Self>(data)
            .map_err(|e| ProtocolError::InvalidFrame(e.to_string()))?;
        Ok(Some(event))
    }
}
