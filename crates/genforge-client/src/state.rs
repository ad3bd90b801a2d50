/// Finite generation phase for a single request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No request in flight.
    Idle,
    /// Wire events are being consumed.
    Streaming,
    /// Terminal: the extracted artifact is in `code`.
    Succeeded,
    /// Terminal: `error` holds the cause; partial `code` is preserved.
    Failed,
}

/// Snapshot of the consumer state, rendered directly by a UI layer.
///
/// While streaming, `code` is the live raw buffer (possibly still
/// fenced); after success it is replaced by the relay-extracted
/// artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorState {
    /// The prompt that started the current request.
    pub prompt: String,
    /// Progressive raw text, then the final artifact on success.
    pub code: String,
    /// Drives the UI loading indicator.
    pub is_loading: bool,
    /// Human-readable failure cause, if any.
    pub error: Option<String>,
    /// Current phase of the state machine.
    pub phase: Phase,
}

impl GeneratorState {
    pub(crate) fn idle() -> Self {
        Self {
            prompt: String::new(),
            code: String::new(),
            is_loading: false,
            error: None,
            phase: Phase::Idle,
        }
    }
}

impl Default for GeneratorState {
    fn default() -> Self {
        Self::idle()
    }
}
