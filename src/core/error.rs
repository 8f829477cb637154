// src/core/error.rs

use crate::core::models::{ErrorKind, ErrorResponse};
use thiserror::Error;

/// Failures that stop a scan request. Individual probe failures are never
/// represented here; they are absorbed into the record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScanError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScanError::InvalidInput(_) => ErrorKind::InvalidInput,
            ScanError::AuthorizationDenied(_) => ErrorKind::AuthorizationDenied,
            ScanError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for errors caused by the request rather than by us.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ScanError::Internal(_))
    }

    fn message(&self) -> &str {
        match self {
            ScanError::InvalidInput(m) | ScanError::AuthorizationDenied(m) | ScanError::Internal(m) => m,
        }
    }
}

impl From<&ScanError> for ErrorResponse {
    fn from(err: &ScanError) -> Self {
        ErrorResponse {
            kind: err.kind(),
            message: err.message().to_string(),
        }
    }
}

impl From<reqwest::Error> for ScanError {
    fn from(err: reqwest::Error) -> Self {
        ScanError::Internal(format!("HTTP client setup failed: {err}"))
    }
}
