//! Error types for Arlo API operations.

/// Errors surfaced by the Arlo client.
///
/// HTTP-level failures (connection errors, non-2xx statuses) are always
/// raised through this type. Application-level failures, where the server
/// answers 200 with `"success": false` in the body, are *not* errors: the
/// decoded body is handed back to the caller, who is expected to check the
/// `success` flag themselves.
#[derive(Debug, thiserror::Error)]
pub enum ArloError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A session-scoped operation was called before `login` succeeded.
    /// Raised before any network I/O takes place.
    #[error("authentication required: call login() first")]
    AuthenticationRequired,

    /// The server answered 2xx but the body was missing a field this
    /// client needs to continue (e.g. no `data.url` in a start-stream
    /// response).
    #[error("unexpected response shape: {0}")]
    UnexpectedResponse(&'static str),

    /// The operation exists in the upstream API surface but has no working
    /// implementation.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
