use std::collections::VecDeque;
use std::pin::Pin;

use futures::StreamExt as _;
use futures::stream;
use genforge_protocol::SseDecoder;
use tracing::debug;

use crate::errors::{RelayError, UpstreamError};
use crate::upstream::{
    CompletionRequest, ProviderId, UpstreamClient, UpstreamEvent, UpstreamStreamHandle,
};

use super::config::AnthropicConfig;
use super::transport::map_anthropic_frame_to_events;

const ANTHROPIC_PROVIDER: &str = "anthropic";
const ANTHROPIC_VERSION: &str = "2023-06-01";

type ByteStream =
    Pin<Box<dyn futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Upstream client for the Anthropic Messages API (streaming).
#[derive(Debug)]
pub struct AnthropicClient {
    client: reqwest::Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Creates a client from explicit configuration.
    pub fn new(config: AnthropicConfig) -> Result<Self, RelayError> {
        if config.api_key.trim().is_empty() {
            return Err(RelayError::Config(
                "Anthropic config api_key must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build Anthropic client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a client using `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::new(AnthropicConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl UpstreamClient for AnthropicClient {
    fn id(&self) -> ProviderId {
        ProviderId::new(ANTHROPIC_PROVIDER)
    }

    async fn start_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<UpstreamStreamHandle, UpstreamError> {
        let provider_id = ProviderId::new(ANTHROPIC_PROVIDER);
        let body = build_request_body(&request);
        debug!(request_id = %request.request_id, model = %request.model, "starting Anthropic messages stream");

        let response = self
            .client
            .post(self.config.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                UpstreamError::transport(
                    provider_id.clone(),
                    format!("Anthropic request failed: {e}"),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UpstreamError::provider(
                provider_id,
                format!("Anthropic messages request failed with status {status}: {body}"),
                Some(status.as_u16()),
            ));
        }

        let bytes_stream: ByteStream = Box::pin(response.bytes_stream());
        Ok(UpstreamStreamHandle {
            stream: Box::pin(anthropic_event_stream(provider_id, bytes_stream)),
        })
    }
}

pub(crate) fn build_request_body(request: &CompletionRequest) -> serde_json::Value {
    serde_json::json!({
        "model": request.model,
        "max_tokens": request.max_output_tokens,
        "stream": true,
        "system": request.system_prompt,
        "messages": [{
            "role": "user",
            "content": request.user_prompt,
        }],
    })
}

fn anthropic_event_stream(
    provider_id: ProviderId,
    bytes_stream: ByteStream,
) -> impl futures::Stream<Item = Result<UpstreamEvent, UpstreamError>> + Send {
    struct State {
        provider_id: ProviderId,
        bytes_stream: ByteStream,
        decoder: SseDecoder,
        pending: VecDeque<UpstreamEvent>,
        done: bool,
    }

    stream::try_unfold(
        State {
            provider_id,
            bytes_stream,
            decoder: SseDecoder::default(),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(event) = state.pending.pop_front() {
                    return Ok(Some((event, state)));
                }
                if state.done {
                    return Ok(None);
                }

                match state.bytes_stream.next().await {
                    Some(Ok(chunk)) => {
                        for frame in state.decoder.push_chunk(&chunk) {
                            let events =
                                map_anthropic_frame_to_events(&state.provider_id, &frame)?;
                            state.pending.extend(events);
                        }
                    }
                    Some(Err(e)) => {
                        return Err(UpstreamError::transport(
                            state.provider_id,
                            format!("Anthropic streaming read failed: {e}"),
                        ));
                    }
                    None => {
                        state.done = true;
                    }
                }
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            request_id: uuid::Uuid::new_v4(),
            system_prompt: "emit code".into(),
            user_prompt: "a timer".into(),
            model: "claude-sonnet-4-5".into(),
            max_output_tokens: 8192,
        }
    }

    #[test]
    fn request_body_has_stream_and_fixed_limits() {
        let body = build_request_body(&request());
        assert_eq!(body.get("stream").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(body.get("max_tokens").and_then(|v| v.as_u64()), Some(8192));
        assert_eq!(body.get("system").and_then(|v| v.as_str()), Some("emit code"));
        let messages = body.get("messages").and_then(|v| v.as_array()).expect("messages");
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].get("role").and_then(|v| v.as_str()),
            Some("user")
        );
    }

    #[test]
    fn blank_api_key_is_a_config_error() {
        let err = AnthropicClient::new(AnthropicConfig::new("  ")).expect_err("should fail");
        assert!(matches!(err, RelayError::Config(msg) if msg.contains("api_key")));
    }

    #[tokio::test]
    async fn event_stream_decodes_chunked_sse_bytes() {
        let payload = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\"}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"hi\"}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        // Split mid-frame to exercise decoder buffering.
        let (a, b) = payload.as_bytes().split_at(70);
        let bytes_stream: ByteStream = Box::pin(stream::iter(vec![
            Ok(bytes::Bytes::copy_from_slice(a)),
            Ok(bytes::Bytes::copy_from_slice(b)),
        ]));

        let events: Vec<_> =
            anthropic_event_stream(ProviderId::new(ANTHROPIC_PROVIDER), bytes_stream)
                .collect::<Vec<_>>()
                .await;
        let events: Vec<_> = events.into_iter().collect::<Result<_, _>>().expect("ok");
        assert_eq!(
            events,
            vec![
                UpstreamEvent::TextDelta { text: "hi".into() },
                UpstreamEvent::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn env_gated_smoke_stream_if_key_present() {
        if std::env::var("ANTHROPIC_API_KEY")
            .unwrap_or_default()
            .trim()
            .is_empty()
        {
            eprintln!("skipping Anthropic smoke test (ANTHROPIC_API_KEY missing)");
            return;
        }

        let client = AnthropicClient::from_env().expect("client");
        let mut handle = client
            .start_stream(CompletionRequest {
                request_id: uuid::Uuid::new_v4(),
                system_prompt: "Reply with a single word.".into(),
                user_prompt: "ok".into(),
                model: "claude-haiku-4-5".into(),
                max_output_tokens: 64,
            })
            .await
            .expect("start stream");

        let mut saw_text = false;
        while let Some(event) = handle.stream.next().await {
            match event.expect("stream event") {
                UpstreamEvent::TextDelta { .. } => saw_text = true,
                UpstreamEvent::Completed => break,
                UpstreamEvent::Unrecognized { .. } => {}
            }
        }
        assert!(saw_text, "expected at least one text delta");
    }
}
