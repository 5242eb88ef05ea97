//! Error types raised by LLM clients.
//!
//! Traced proxies never produce these themselves; they only return what the
//! wrapped client returned.

use thiserror::Error;

/// Errors a chat client or chat model can fail with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The provider throttled the request
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after_secs: Option<u64>,
    },

    /// Missing or rejected credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The provider rejected the request body
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Any other non-success HTTP status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure before a response arrived
    #[error("Connection error: {0}")]
    Connection(String),

    /// The client does not implement this call shape
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ClientError {
    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after_secs: None,
        }
    }

    pub fn unsupported(what: impl Into<String>) -> Self {
        Self::Unsupported(what.into())
    }

    /// Error class name recorded as `error.type` on spans.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RateLimit { .. } => "RateLimitError",
            Self::Authentication(_) => "AuthenticationError",
            Self::Timeout(_) => "APITimeoutError",
            Self::InvalidRequest(_) => "BadRequestError",
            Self::Api { .. } => "APIStatusError",
            Self::Connection(_) => "APIConnectionError",
            Self::Unsupported(_) => "NotSupportedError",
            Self::Other(_) => "ClientError",
        }
    }

    /// HTTP status implied by the error, when there is one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimit { .. } => Some(429),
            Self::Authentication(_) => Some(401),
            Self::InvalidRequest(_) => Some(400),
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for client calls.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_status() {
        let err = ClientError::rate_limit("slow down");
        assert_eq!(err.kind(), "RateLimitError");
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.to_string(), "Rate limit exceeded: slow down");

        let err = ClientError::Api {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.kind(), "APIStatusError");
        assert_eq!(err.status_code(), Some(503));

        assert_eq!(ClientError::Connection("reset".into()).status_code(), None);
    }
}
