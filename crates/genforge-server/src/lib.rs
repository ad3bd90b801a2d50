//! HTTP boundary for the genforge relay.
//!
//! `POST /api/v1/generate` accepts `{ "prompt": "..." }` and answers
//! with a Server-Sent Events stream of wire events; invalid requests
//! are rejected synchronously with a JSON error body before any
//! stream opens.

/// Environment-based configuration.
pub mod config;
/// Process-wide tracing initialization.
pub mod observability;
/// Axum router and handlers.
pub mod routes;
