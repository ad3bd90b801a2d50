//! Wire protocol shared by the genforge relay and its consumers.
//!
//! The relay republishes upstream model output as a flat sequence of
//! [`WireEvent`]s over Server-Sent Events: zero or more `code_delta`
//! frames followed by exactly one terminal `done` or `error` frame.
//! This crate owns the event types, their SSE encoding, and the
//! incremental decoder used on the consuming side.

/// Errors raised while parsing wire frames.
pub mod errors;
/// Incremental SSE framing and frame parsing.
pub mod sse;
/// The normalized wire event union.
pub mod wire;

pub use errors::ProtocolError;
pub use sse::{SseDecoder, SseFrame};
pub use wire::WireEvent;
