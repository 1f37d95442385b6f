//! Event store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur against the event store API.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Server error {0}: {1}")]
    ServerError(u16, String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn auth_error(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    /// Classify an HTTP error status, extracting a Retry-After hint on 429.
    pub fn from_http_status(status: u16, body: impl Into<String>, retry_after_ms: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::AuthError(body.into()),
            429 => Self::RateLimited(retry_after_ms.unwrap_or(1000)),
            500..=599 => Self::ServerError(status, body.into()),
            _ => Self::RequestFailed(format!("HTTP {}: {}", status, body.into())),
        }
    }

    /// Check if the error is retryable (network, 429, 5xx).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Network(_) | StoreError::RateLimited(_) | StoreError::ServerError(_, _)
        )
    }

    /// Retry-After hint in milliseconds, when the server provided one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            StoreError::from_http_status(401, "denied", None),
            StoreError::AuthError(_)
        ));
        assert!(matches!(
            StoreError::from_http_status(429, "slow down", Some(2000)),
            StoreError::RateLimited(2000)
        ));
        assert!(matches!(
            StoreError::from_http_status(503, "unavailable", None),
            StoreError::ServerError(503, _)
        ));
        assert!(matches!(
            StoreError::from_http_status(400, "bad", None),
            StoreError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_retryable_classification() {
        assert!(StoreError::from_http_status(500, "", None).is_retryable());
        assert!(StoreError::from_http_status(429, "", None).is_retryable());
        assert!(!StoreError::from_http_status(400, "", None).is_retryable());
        assert!(!StoreError::from_http_status(403, "", None).is_retryable());
    }

    #[test]
    fn test_retry_after_hint() {
        assert_eq!(
            StoreError::from_http_status(429, "", Some(5000)).retry_after_ms(),
            Some(5000)
        );
        assert_eq!(
            StoreError::from_http_status(500, "", None).retry_after_ms(),
            None
        );
    }
}
