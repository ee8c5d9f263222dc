//! Inference error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    /// The request never produced an HTTP response.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body had no completion text where one was expected.
    #[error("Malformed completion response: {0}")]
    Malformed(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),

    /// Every allowed attempt failed; `last` is the final failure.
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<InferenceError>,
    },
}

impl InferenceError {
    /// Transport failures and non-2xx statuses are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

impl From<reqwest::Error> for InferenceError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
