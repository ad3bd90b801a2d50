use futures::StreamExt as _;
use genforge_protocol::{SseDecoder, WireEvent};
use tracing::debug;

use crate::errors::ClientError;
use crate::session::GeneratorSession;
use crate::state::GeneratorState;

/// HTTP consumer for a genforge relay endpoint.
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a client for the relay at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Runs one generation request to completion.
    ///
    /// `on_state` observes every state snapshot as the stream arrives,
    /// for progressive rendering; the final snapshot is also returned.
    /// Pre-stream rejections (validation, configuration) surface as
    /// `Err`; anything after the stream starts resolves into the
    /// returned state, `Failed` at worst.
    pub async fn generate(
        &self,
        prompt: impl Into<String>,
        mut on_state: impl FnMut(&GeneratorState),
    ) -> Result<GeneratorState, ClientError> {
        let prompt = prompt.into();
        let url = format!(
            "{}/api/v1/generate",
            self.base_url.trim_end_matches('/')
        );

        let response = self
            .http
            .post(url)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await
            .map_err(|e| ClientError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let mut session = GeneratorSession::new();
        on_state(session.dispatch(prompt));

        let byte_stream = response
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(|e| e.to_string()));
        let final_state = consume_sse_bytes(session, byte_stream, on_state).await;
        Ok(final_state)
    }
}

/// Folds a chunked SSE byte stream into the session until the
/// transport closes, then resolves the terminal state.
///
/// Transport read errors and malformed frames are treated like an
/// abnormal close: the session ends `Failed` rather than hanging.
pub(crate) async fn consume_sse_bytes(
    mut session: GeneratorSession,
    byte_stream: impl futures::Stream<Item = Result<Vec<u8>, String>>,
    mut on_state: impl FnMut(&GeneratorState),
) -> GeneratorState {
    let mut decoder = SseDecoder::default();
    futures::pin_mut!(byte_stream);

    while let Some(chunk) = byte_stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!(error = %e, "transport read failed mid-stream");
                break;
            }
        };
        for frame in decoder.push_chunk(&chunk) {
            match WireEvent::from_sse_frame(&frame) {
                Ok(Some(event)) => {
                    on_state(session.apply(&event));
                    if session.is_terminal() {
                        return session.state().clone();
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(error = %e, "dropping malformed wire frame");
                }
            }
        }
    }

    let state = session.close().clone();
    on_state(&state);
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use futures::stream;

    fn chunks(frames: &[&str]) -> Vec<Result<Vec<u8>, String>> {
        frames.iter().map(|f| Ok(f.as_bytes().to_vec())).collect()
    }

    fn streaming_session(prompt: &str) -> GeneratorSession {
        let mut session = GeneratorSession::new();
        session.dispatch(prompt);
        session
    }

    #[tokio::test]
    async fn terminal_done_resolves_succeeded() {
        let bytes = chunks(&[
            &WireEvent::CodeDelta { content: "ab".into() }.to_sse(),
            &WireEvent::CodeDelta { content: "cd".into() }.to_sse(),
            &WireEvent::Done { code: "abcd".into() }.to_sse(),
        ]);

        let mut snapshots = Vec::new();
        let state = consume_sse_bytes(
            streaming_session("p"),
            stream::iter(bytes),
            |s: &GeneratorState| snapshots.push(s.code.clone()),
        )
        .await;

        assert_eq!(state.phase, Phase::Succeeded);
        assert_eq!(state.code, "abcd");
        assert!(!state.is_loading);
        assert_eq!(snapshots, vec!["ab", "abcd", "abcd"]);
    }

    #[tokio::test]
    async fn terminal_error_keeps_partial_code() {
        let bytes = chunks(&[
            &WireEvent::CodeDelta { content: "ab".into() }.to_sse(),
            &WireEvent::Error { message: "boom".into() }.to_sse(),
        ]);

        let state =
            consume_sse_bytes(streaming_session("p"), stream::iter(bytes), |_| {}).await;
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.error.as_deref(), Some("boom"));
        assert_eq!(state.code, "ab");
    }

    #[tokio::test]
    async fn close_with_zero_events_resolves_failed() {
        let state =
            consume_sse_bytes(streaming_session("p"), stream::iter(chunks(&[])), |_| {}).await;
        assert_eq!(state.phase, Phase::Failed);
        assert!(state.error.is_some());
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn transport_error_mid_stream_resolves_failed() {
        let bytes = vec![
            Ok(WireEvent::CodeDelta { content: "ab".into() }
                .to_sse()
                .into_bytes()),
            Err("connection reset".to_string()),
        ];

        let state =
            consume_sse_bytes(streaming_session("p"), stream::iter(bytes), |_| {}).await;
        assert_eq!(state.phase, Phase::Failed);
        assert_eq!(state.code, "ab");
    }

    #[tokio::test]
    async fn keep_alive_pings_are_invisible_to_state() {
        let bytes = chunks(&[
            ": ping\n\n",
            &WireEvent::Done { code: "x".into() }.to_sse(),
        ]);

        let mut snapshot_count = 0usize;
        let state = consume_sse_bytes(streaming_session("p"), stream::iter(bytes), |_| {
            snapshot_count += 1;
        })
        .await;
        assert_eq!(state.phase, Phase::Succeeded);
        assert_eq!(snapshot_count, 1);
    }

    #[tokio::test]
    async fn frames_split_across_chunks_reassemble() {
        let frame = WireEvent::Done { code: "whole".into() }.to_sse();
        let (a, b) = frame.as_bytes().split_at(10);
        let bytes = vec![Ok(a.to_vec()), Ok(b.to_vec())];

        let state =
            consume_sse_bytes(streaming_session("p"), stream::iter(bytes), |_| {}).await;
        assert_eq!(state.phase, Phase::Succeeded);
        assert_eq!(state.code, "whole");
    }
}
