//! Global application error types.
//!
//! This module defines the error taxonomy used across the client core and
//! the classification rules the authentication policy depends on: a
//! definitive credential rejection forces a logout, while everything else
//! (timeouts, unreachable backend, 5xx) is survivable and only degrades
//! the connection indicator.

use thiserror::Error;

/// Represents failures while talking to the WORK360 backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend refused the credential (HTTP 401/403).
    #[error("authentication rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    /// Any other definitive client-side rejection (400, 404, 422, ...).
    #[error("request failed ({status}): {message}")]
    Status { status: u16, message: String },
    /// The backend errored out (5xx).
    #[error("backend error ({status}): {message}")]
    Server { status: u16, message: String },
    /// The request never completed (connect, DNS, dropped socket).
    #[error("network error: {0}")]
    Network(String),
    /// The request exceeded the client-side timeout.
    #[error("request timed out")]
    Timeout,
    /// The response body could not be decoded.
    #[error("invalid response payload: {0}")]
    Payload(String),
}

impl ApiError {
    /// True only for HTTP 401/403: proof the token is invalid or revoked.
    ///
    /// This is the sole branch point of the reconciliation policy. Every
    /// other failure leaves the optimistic session in place.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ApiError::Rejected { .. })
    }

    /// True for failures that say nothing about the credential: the backend
    /// was unreachable, slow, or broken.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Timeout
        )
    }

    /// Human-readable message suitable for a form or banner.
    pub fn message(&self) -> String {
        match self {
            ApiError::Rejected { message, .. }
            | ApiError::Status { message, .. }
            | ApiError::Server { message, .. } => message.clone(),
            ApiError::Network(message) => message.clone(),
            ApiError::Timeout => "request timed out".to_string(),
            ApiError::Payload(message) => message.clone(),
        }
    }
}

/// Generic service error surfaced to callers of the auth actions.
///
/// Login and register are the one place the core returns a failure to the
/// caller instead of converting it into state, so a form can show a
/// field-level message.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("{message}")]
    Rejected { message: String },

    #[error("backend unavailable: {message}")]
    Unavailable { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    // Helper constructors for common patterns

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } | ApiError::Status { message, .. } => {
                Self::Rejected { message }
            }
            ApiError::Server { message, .. } => Self::Unavailable { message },
            ApiError::Network(message) => Self::Unavailable { message },
            ApiError::Timeout => Self::Unavailable {
                message: "request timed out".to_string(),
            },
            ApiError::Payload(message) => Self::Internal { message },
        }
    }
}
