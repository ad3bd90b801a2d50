use std::sync::Arc;

use futures::StreamExt as _;
use genforge_protocol::WireEvent;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::errors::{RelayError, UpstreamError};
use crate::extract::extract_code;
use crate::upstream::{CompletionRequest, UpstreamClient, UpstreamEvent};

/// Message used when an upstream failure carries no description.
const UNKNOWN_ERROR: &str = "Unknown error";

/// A single generation request.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct GenerationRequest {
    /// Natural-language description of the artifact to generate.
    pub prompt: String,
}

/// Handle used to cancel an in-flight relay stream.
///
/// Cancellation stops upstream consumption and closes the outbound
/// stream without a terminal event; disconnection is itself the
/// termination signal.
#[derive(Clone)]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Requests cancellation. Best-effort and idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Server-side driver: one upstream call, one outbound stream.
///
/// Requests are independent; each gets its own accumulator and channel,
/// so concurrent generations share no mutable state.
#[derive(Clone)]
pub struct Relay {
    upstream: Arc<dyn UpstreamClient>,
    config: RelayConfig,
}

impl Relay {
    /// Creates a relay over the given upstream client.
    pub fn new(upstream: Arc<dyn UpstreamClient>, config: RelayConfig) -> Self {
        Self { upstream, config }
    }

    /// Validates the request and starts the relay stream.
    ///
    /// Validation failures are synchronous: no stream is opened and no
    /// wire event is produced. Once this returns `Ok`, every further
    /// failure degrades to a terminal `error` wire event instead.
    pub async fn generate(&self, request: GenerationRequest) -> Result<RelayStream, RelayError> {
        if request.prompt.trim().is_empty() {
            return Err(RelayError::Validation("prompt must not be empty".into()));
        }
        if self.config.stream_buffer_capacity == 0 {
            return Err(RelayError::Validation(
                "stream_buffer_capacity must be greater than 0".into(),
            ));
        }

        let completion = CompletionRequest {
            request_id: uuid::Uuid::new_v4(),
            system_prompt: self.config.system_prompt.clone(),
            user_prompt: request.prompt,
            model: self.config.model.clone(),
            max_output_tokens: self.config.max_output_tokens,
        };
        let request_id = completion.request_id;

        let (tx, rx) = mpsc::channel(self.config.stream_buffer_capacity);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let cancel_handle = CancelHandle { tx: cancel_tx };

        tokio::spawn(relay_task(
            self.upstream.clone(),
            self.config.clone(),
            completion,
            tx,
            cancel_rx,
        ));

        Ok(RelayStream {
            request_id,
            rx,
            cancel_handle,
            saw_terminal: false,
        })
    }
}

/// Outbound stream handle returned by [`Relay::generate`].
///
/// Yields zero or more `code_delta` events followed by exactly one
/// terminal event. Dropping the handle disconnects the stream and stops
/// the relay task.
#[derive(Debug)]
pub struct RelayStream {
    request_id: uuid::Uuid,
    rx: mpsc::Receiver<WireEvent>,
    cancel_handle: CancelHandle,
    saw_terminal: bool,
}

impl RelayStream {
    /// Returns the request id for this stream (log correlation only).
    pub fn request_id(&self) -> uuid::Uuid {
        self.request_id
    }

    /// Returns a handle that can cancel the stream.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel_handle.clone()
    }

    /// Waits for the next wire event.
    ///
    /// Returns `None` once the channel closes; after a terminal event
    /// that is the normal end of stream, otherwise it means the relay
    /// stopped without one (cancellation).
    pub async fn next_event(&mut self) -> Option<WireEvent> {
        if self.saw_terminal {
            return None;
        }
        let event = self.rx.recv().await;
        if let Some(event) = &event
            && event.is_terminal()
        {
            self.saw_terminal = true;
        }
        event
    }
}

async fn relay_task(
    upstream: Arc<dyn UpstreamClient>,
    config: RelayConfig,
    request: CompletionRequest,
    tx: mpsc::Sender<WireEvent>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let request_id = request.request_id;
    let provider = upstream.id();
    debug!(request_id = %request_id, provider = %provider, model = %request.model, "starting upstream stream");

    let mut handle = match upstream.start_stream(request).await {
        Ok(handle) => handle,
        Err(err) => {
            warn!(request_id = %request_id, error = %err, "upstream open failed");
            let _ = tx.send(error_event(&err)).await;
            return;
        }
    };

    // AccumulatedText: owned by this task, appended per delta, consumed
    // exactly once by the extractor at end of stream.
    let mut accumulated = String::new();
    let mut seq = 0_u64;

    loop {
        let next = tokio::select! {
            changed = cancel_rx.changed() => {
                match changed {
                    Ok(()) if *cancel_rx.borrow() => {
                        debug!(request_id = %request_id, seq, "relay cancelled, releasing upstream");
                        return;
                    }
                    Ok(()) => continue,
                    // All cancel handles dropped with the stream handle.
                    Err(_) => return,
                }
            }
            _ = tx.closed() => {
                debug!(request_id = %request_id, seq, "client disconnected, releasing upstream");
                return;
            }
            next = tokio::time::timeout(config.idle_timeout, handle.stream.next()) => next,
        };

        match next {
            Err(_elapsed) => {
                let err = UpstreamError::transport(
                    provider.clone(),
                    format!(
                        "no upstream event within {}s",
                        config.idle_timeout.as_secs()
                    ),
                );
                warn!(request_id = %request_id, error = %err, "upstream idle timeout");
                let _ = tx.send(error_event(&err)).await;
                return;
            }
            Ok(Some(Ok(UpstreamEvent::TextDelta { text }))) => {
                if text.is_empty() {
                    continue;
                }
                debug!(request_id = %request_id, seq, "relaying text delta");
                accumulated.push_str(&text);
                seq = seq.saturating_add(1);
                if tx.send(WireEvent::CodeDelta { content: text }).await.is_err() {
                    return;
                }
            }
            Ok(Some(Ok(UpstreamEvent::Unrecognized { kind }))) => {
                if config.ignore_unrecognized_events {
                    debug!(request_id = %request_id, kind = %kind, "skipping unrecognized upstream event");
                    continue;
                }
                let err = UpstreamError::protocol(
                    provider.clone(),
                    format!("unrecognized upstream event: {kind}"),
                );
                let _ = tx.send(error_event(&err)).await;
                return;
            }
            Ok(Some(Ok(UpstreamEvent::Completed))) | Ok(None) => {
                let code = extract_code(&accumulated);
                debug!(request_id = %request_id, seq, code_len = code.len(), "upstream complete, emitting done");
                let _ = tx.send(WireEvent::Done { code }).await;
                return;
            }
            Ok(Some(Err(err))) => {
                warn!(request_id = %request_id, error = %err, "upstream stream failed");
                let _ = tx.send(error_event(&err)).await;
                return;
            }
        }
    }
}

fn error_event(err: &UpstreamError) -> WireEvent {
    let message = err.message().trim();
    WireEvent::Error {
        message: if message.is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            err.to_string()
        },
    }
}
