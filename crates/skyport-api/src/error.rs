//! Control plane client error types

use skyport_cloud::RemoteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Control plane returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl From<ApiError> for RemoteError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status {
                status: 404,
                message,
            } => RemoteError::NotFound(message),
            ApiError::Status {
                status: 423,
                message,
            } => RemoteError::Locked(message),
            // No structured signal; fall back to the message text
            ApiError::Status { message, .. } => RemoteError::classify(message),
            other => RemoteError::Other(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, message: &str) -> ApiError {
        ApiError::Status {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_status_codes_take_precedence() {
        assert_eq!(
            RemoteError::from(status(404, "gone")),
            RemoteError::NotFound("gone".to_string())
        );
        assert_eq!(
            RemoteError::from(status(423, "busy")),
            RemoteError::Locked("busy".to_string())
        );
    }

    #[test]
    fn test_message_fallback() {
        assert!(RemoteError::from(status(409, "resource is locked")).is_locked());
        assert!(RemoteError::from(status(400, "Not found")).is_not_found());
        assert_eq!(
            RemoteError::from(status(500, "internal error")),
            RemoteError::Other("internal error".to_string())
        );
    }
}
