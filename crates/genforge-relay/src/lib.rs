//! Server-side core of the genforge code-generation relay.
//!
//! The [`Relay`] opens one streaming completion call per request,
//! republishes every upstream text delta as a `code_delta` wire event,
//! and closes the stream with exactly one terminal event: `done`
//! carrying the extracted code artifact, or `error` carrying the
//! failure description.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use genforge_protocol::WireEvent;
//! use genforge_relay::vendors::anthropic::AnthropicClient;
//! use genforge_relay::{GenerationRequest, Relay, RelayConfig, RelayError};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), RelayError> {
//! let relay = Relay::new(
//!     Arc::new(AnthropicClient::from_env()?),
//!     RelayConfig::default(),
//! );
//!
//! let mut stream = relay
//!     .generate(GenerationRequest {
//!         prompt: "A pomodoro timer".into(),
//!     })
//!     .await?;
//!
//! while let Some(event) = stream.next_event().await {
//!     match event {
//!         WireEvent::CodeDelta { content } => print!("{content}"),
//!         WireEvent::Done { code } => println!("\n--- extracted ---\n{code}"),
//!         WireEvent::Error { message } => eprintln!("relay error: {message}"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Relay configuration including the injected system prompt.
pub mod config;
/// Public error types for the relay API.
pub mod errors;
/// Code-artifact extraction from accumulated model output.
pub mod extract;
/// The relay driver and its stream handle.
pub mod relay;
/// Upstream client contract used by vendor integrations.
pub mod upstream;
/// Vendor-specific upstream clients.
pub mod vendors;

pub use config::RelayConfig;
pub use errors::{RelayError, UpstreamError};
pub use extract::extract_code;
pub use relay::{CancelHandle, GenerationRequest, Relay, RelayStream};
pub use upstream::{
    CompletionRequest, ProviderId, UpstreamClient, UpstreamEvent, UpstreamStreamHandle,
};
