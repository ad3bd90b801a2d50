//! Anthropic Messages API integration (streaming).
//!
//! Vendor-specific configuration and event mapping live here so the
//! relay core stays provider-agnostic behind [`crate::UpstreamClient`].
mod adapter;
mod config;
pub(crate) mod transport;

pub use adapter::AnthropicClient;
pub use config::AnthropicConfig;
