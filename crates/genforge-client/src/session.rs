use genforge_protocol::WireEvent;
use tracing::debug;

use crate::state::{GeneratorState, Phase};

/// Message shown when the transport closes without a terminal event.
const ABNORMAL_CLOSE: &str = "stream ended before completion";

/// State machine for one generation request.
///
/// Phases move `Idle → Streaming → {Succeeded | Failed}`. Terminal
/// phases are terminal for the current request; dispatching again
/// starts a fresh cycle with its own buffer, so no state leaks across
/// requests.
#[derive(Debug, Default)]
pub struct GeneratorSession {
    state: GeneratorState,
    saw_terminal: bool,
}

impl GeneratorSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state snapshot.
    pub fn state(&self) -> &GeneratorState {
        &self.state
    }

    /// True once a terminal wire event or close has been observed.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state.phase, Phase::Succeeded | Phase::Failed)
    }

    /// Starts a new request: `Idle → Streaming`.
    ///
    /// Resets the accumulated buffer, clears any previous error, and
    /// raises the loading flag. Safe to call from any phase.
    pub fn dispatch(&mut self, prompt: impl Into<String>) -> &GeneratorState {
        self.state = GeneratorState {
            prompt: prompt.into(),
            code: String::new(),
            is_loading: true,
            error: None,
            phase: Phase::Streaming,
        };
        self.saw_terminal = false;
        &self.state
    }

    /// Applies one wire event.
    ///
    /// Events outside the `Streaming` phase are ignored; the relay
    /// never emits anything after a terminal event, so this only guards
    /// against misuse.
    pub fn apply(&mut self, event: &WireEvent) -> &GeneratorState {
        if self.state.phase != Phase::Streaming {
            debug!(phase = ?self.state.phase, tag = event.tag(), "ignoring event outside streaming phase");
            return &self.state;
        }
        match event {
            WireEvent::CodeDelta { content } => {
                self.state.code.push_str(content);
            }
            WireEvent::Done { code } => {
                // Replace the progressive raw buffer with the extracted artifact.
                self.state.code = code.clone();
                self.state.is_loading = false;
                self.state.phase = Phase::Succeeded;
                self.saw_terminal = true;
            }
            WireEvent::Error { message } => {
                // Partial code is preserved for debugging/recovery.
                self.state.error = Some(message.clone());
                self.state.is_loading = false;
                self.state.phase = Phase::Failed;
                self.saw_terminal = true;
            }
        }
        &self.state
    }

    /// Signals that the transport closed.
    ///
    /// A close while still streaming means no terminal event arrived;
    /// the session resolves to `Failed` with a generic message rather
    /// than hanging in a loading state.
    pub fn close(&mut self) -> &GeneratorState {
        if self.state.phase == Phase::Streaming && !self.saw_terminal {
            self.state.error = Some(ABNORMAL_CLOSE.to_string());
            self.state.is_loading = false;
            self.state.phase = Phase::Failed;
        }
        &self.state
    }

    /// Cancels the current request: back to `Idle`, partial state
    /// discarded. Not a failure.
    pub fn cancel(&mut self) -> &GeneratorState {
        self.state = GeneratorState::idle();
        self.saw_terminal = false;
        &self.state
    }
}
