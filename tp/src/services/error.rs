//! Collaborator error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to a collaborator service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ServiceError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::ApiError { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            ServiceError::Network(_) => true,
            ServiceError::Timeout(_) => true,
            ServiceError::InvalidResponse(_) => false,
            ServiceError::Json(_) => false,
            ServiceError::InvalidUrl(_) => false,
        }
    }

    /// HTTP status, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ServiceError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        // 5xx errors should be retryable
        assert!(
            ServiceError::ApiError {
                status: 503,
                message: "Unavailable".to_string()
            }
            .is_retryable()
        );

        assert!(
            ServiceError::ApiError {
                status: 429,
                message: "Slow down".to_string()
            }
            .is_retryable()
        );

        // 4xx errors should not be retryable
        assert!(
            !ServiceError::ApiError {
                status: 404,
                message: "Not found".to_string()
            }
            .is_retryable()
        );

        assert!(ServiceError::Timeout(Duration::from_secs(10)).is_retryable());
        assert!(!ServiceError::InvalidResponse("Bad JSON".to_string()).is_retryable());
    }

    #[test]
    fn test_status() {
        let err = ServiceError::ApiError {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(ServiceError::InvalidResponse("x".to_string()).status(), None);
    }
}
