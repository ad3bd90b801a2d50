/// Errors surfaced by [`crate::Client`] before a stream is consumed.
///
/// Once the SSE stream has started, failures resolve into a `Failed`
/// state snapshot instead of an error return.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("config error: {0}")]
    Config(String),
    /// The request never produced a stream (connection failed).
    #[error("request error: {0}")]
    Request(String),
    /// The relay rejected the request synchronously (pre-stream).
    #[error("relay rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}
