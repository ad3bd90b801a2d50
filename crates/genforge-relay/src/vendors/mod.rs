//! Vendor-specific upstream clients.
pub mod anthropic;
