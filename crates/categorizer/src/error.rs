use thiserror::Error;

/// Failure taxonomy for one batch completion call.
///
/// Responses are classified into these variants exactly once, at the network
/// boundary in [`crate::client::CompletionClient`]. The retry loop and the
/// categorizer only ever match on variants, never on transport shapes.
#[derive(Debug, Error)]
pub enum CategorizeError {
    /// HTTP 429 from the completion endpoint. The only retryable failure.
    /// `retry_after` carries the server's `Retry-After` hint in seconds when
    /// present; the backoff schedule ignores it and doubles a fixed delay.
    #[error("rate limited by completion endpoint")]
    RateLimited { retry_after: Option<u64> },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty response from model")]
    EmptyResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("model reply is not a JSON array")]
    NotAnArray,
}

pub type Result<T> = std::result::Result<T, CategorizeError>;
