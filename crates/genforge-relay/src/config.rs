use std::time::Duration;

/// Default instructions sent with every generation request.
///
/// Kept as an injected configuration value rather than a hidden global
/// so tests and callers can substitute alternate prompts.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an expert software engineer. Generate one complete, \
self-contained source file that satisfies the user's request. \
Respond with only the code, wrapped in a single fenced code block \
with a language tag. Do not add commentary before or after the block.";

/// Behavior and upstream-call configuration for a [`crate::Relay`].
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Static output-format instructions for the upstream call.
    pub system_prompt: String,
    /// Fixed provider model name.
    pub model: String,
    /// Fixed ceiling on generated output tokens.
    pub max_output_tokens: u32,
    /// Maximum wait between upstream events before the relay fails the
    /// stream with an `error` wire event.
    pub idle_timeout: Duration,
    /// Bounded wire-event buffer between the relay task and the
    /// outbound stream; a full buffer backpressures upstream reads.
    pub stream_buffer_capacity: usize,
    /// Skip upstream event shapes the adapter does not recognize
    /// instead of failing the stream. Named policy, not fallthrough.
    pub ignore_unrecognized_events: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: "claude-sonnet-4-5".to_string(),
            max_output_tokens: 8192,
            idle_timeout: Duration::from_secs(60),
            stream_buffer_capacity: 128,
            ignore_unrecognized_events: true,
        }
    }
}

impl RelayConfig {
    /// Overrides the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Overrides the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the output token ceiling.
    pub fn max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = max;
        self
    }

    /// Overrides the upstream idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Overrides the wire-event buffer capacity.
    pub fn stream_buffer_capacity(mut self, capacity: usize) -> Self {
        self.stream_buffer_capacity = capacity;
        self
    }

    /// Sets whether unrecognized upstream events are skipped or fatal.
    pub fn ignore_unrecognized_events(mut self, ignore: bool) -> Self {
        self.ignore_unrecognized_events = ignore;
        self
    }
}
