//! Error types for the Langflow client.

use thiserror::Error;

/// Result type for Langflow operations.
pub type Result<T> = std::result::Result<T, LangflowError>;

/// Errors that can occur when calling the Langflow agent.
#[derive(Debug, Error)]
pub enum LangflowError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status that is not covered by a more specific variant.
    #[error("Langflow returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The API key was rejected (401/403).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Too many requests (429).
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or malformed client configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to serialize/deserialize data.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LangflowError {
    /// Check if this error is retryable.
    ///
    /// Transport errors, rate limiting and 5xx responses are transient;
    /// everything else is returned to the caller immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            LangflowError::Http(_) | LangflowError::RateLimited(_) => true,
            LangflowError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this error is due to authentication.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, LangflowError::Authentication(_))
    }

    /// Map a non-success status and its body to an error.
    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => LangflowError::Authentication(body),
            429 => LangflowError::RateLimited(body),
            _ => LangflowError::Status { status, body },
        }
    }
}

impl From<serde_json::Error> for LangflowError {
    fn from(err: serde_json::Error) -> Self {
        LangflowError::Serialization(err.to_string())
    }
}
