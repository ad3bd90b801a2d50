use genforge_protocol::SseFrame;

use crate::errors::UpstreamError;
use crate::upstream::{ProviderId, UpstreamEvent};

/// Maps one decoded Anthropic SSE frame to upstream events.
///
/// The Messages stream interleaves structural frames
/// (`message_start`, `content_block_start`, `content_block_stop`,
/// `message_delta`, `ping`) with the text-bearing
/// `content_block_delta` frames. Only text deltas, terminal frames,
/// and `error` frames carry relay-visible meaning; anything else maps
/// to `Unrecognized` and the relay's skip policy decides its fate.
pub(crate) fn map_anthropic_frame_to_events(
    provider: &ProviderId,
    frame: &SseFrame,
) -> Result<Vec<UpstreamEvent>, UpstreamError> {
    if frame.data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_str(&frame.data).map_err(|e| {
        UpstreamError::transport(provider.clone(), format!("invalid SSE JSON frame: {e}"))
    })?;

    let Some(event_type) = value.get("type").and_then(|v| v.as_str()) else {
        return Ok(vec![UpstreamEvent::Unrecognized {
            kind: "untyped frame".into(),
        }]);
    };

    match event_type {
        "content_block_delta" => {
            let delta = value.get("delta");
            let delta_type = delta
                .and_then(|d| d.get("type"))
                .and_then(|v| v.as_str())
                .unwrap_or("missing delta");
            if delta_type == "text_delta"
                && let Some(text) = delta.and_then(|d| d.get("text")).and_then(|v| v.as_str())
            {
                return Ok(vec![UpstreamEvent::TextDelta {
                    text: text.to_string(),
                }]);
            }
            Ok(vec![UpstreamEvent::Unrecognized {
                kind: format!("content_block_delta/{delta_type}"),
            }])
        }
        "message_stop" => Ok(vec![UpstreamEvent::Completed]),
        "error" => {
            let message = value
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|v| v.as_str())
                .unwrap_or("Anthropic stream error");
            Err(UpstreamError::provider(provider.clone(), message, None))
        }
        // Structural frames carry no relay-visible payload.
        "message_start" | "content_block_start" | "content_block_stop" | "message_delta"
        | "ping" => Ok(Vec::new()),
        other => Ok(vec![UpstreamEvent::Unrecognized {
            kind: other.to_string(),
        }]),
    }
}
