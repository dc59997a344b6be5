//! Error types for media generation.

use std::time::Duration;

/// Errors that can occur while editing images or generating videos.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Endpoint or API key missing from configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// API key rejected by the service.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Video job reached a terminal state other than `succeeded`.
    #[error("video job {job_id} ended with status {status}")]
    JobTerminated {
        /// Job id assigned by the service.
        job_id: String,
        /// Terminal status reported by the service.
        status: String,
    },

    /// A successful response carried nothing to persist.
    #[error("empty result: {0}")]
    EmptyResult(String),

    /// Polling gave up before the job reached a terminal state.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MediaError {
    /// Builds the error for a non-success HTTP response, keeping the body text.
    pub(crate) fn from_response(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Auth(body),
            _ => Self::Api {
                status,
                message: body,
            },
        }
    }

    /// Returns the HTTP status if this error came from a service response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for media operations.
pub type Result<T> = std::result::Result<T, MediaError>;
