//! Error taxonomy shared by the lifecycle core

use thiserror::Error;

/// Classified failure reported by the remote control plane.
///
/// Clients map transport-level signals (status codes) onto these variants.
/// [`RemoteError::classify`] is the text-based fallback for responses that
/// carry no structured signal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Resource is locked: {0}")]
    Locked(String),

    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// Classify a human-readable error message.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("not found") {
            RemoteError::NotFound(message)
        } else if lower.contains("locked") {
            RemoteError::Locked(message)
        } else {
            RemoteError::Other(message)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RemoteError::NotFound(_))
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, RemoteError::Locked(_))
    }
}

/// Errors raised by the polling, retry and lifecycle machinery
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CloudError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("context canceled")]
    Canceled,

    #[error("{resource} is still locked after {attempts} attempts: {last_error}")]
    Exhausted {
        resource: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid {what}: expected {expected}, got {got:?}")]
    Validation {
        what: String,
        expected: String,
        got: String,
    },

    #[error(
        "{resource}: changing {field} is not supported by the control plane, recreate the resource instead"
    )]
    ImmutableField { resource: String, field: String },
}

impl CloudError {
    pub fn validation(
        what: impl Into<String>,
        expected: impl Into<String>,
        got: impl Into<String>,
    ) -> Self {
        CloudError::Validation {
            what: what.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn immutable(resource: impl Into<String>, field: impl Into<String>) -> Self {
        CloudError::ImmutableField {
            resource: resource.into(),
            field: field.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::Remote(RemoteError::NotFound(_)))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
