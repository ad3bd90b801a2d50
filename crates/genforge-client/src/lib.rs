//! Client-side consumer of the genforge wire protocol.
//!
//! [`GeneratorSession`] is the transport-independent state machine:
//! feed it [`genforge_protocol::WireEvent`]s and read
//! [`GeneratorState`] snapshots for progressive rendering. [`Client`]
//! wires the session to an HTTP relay endpoint, folding the SSE byte
//! stream into state snapshots.

/// Errors surfaced by the HTTP client.
pub mod errors;
/// Generation state machine applied over wire events.
pub mod session;
/// Generation state snapshots exposed to a UI layer.
pub mod state;

mod http;

pub use errors::ClientError;
pub use http::Client;
pub use session::GeneratorSession;
pub use state::{GeneratorState, Phase};
