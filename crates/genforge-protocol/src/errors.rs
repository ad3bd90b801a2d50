/// Errors produced while turning raw SSE frames back into [`crate::WireEvent`]s.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Frame data was not a valid wire event payload.
    #[error("invalid wire frame: {0}")]
    InvalidFrame(String),
}
