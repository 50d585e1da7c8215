use thiserror::Error;

use crate::auth::AuthError;
use crate::database::store::StoreError;

/// Outcome taxonomy of every service operation
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Absent, or present but owned by someone else
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { kind, id } => ServiceError::NotFound(format!("{} {}", kind, id)),
            StoreError::ConstraintViolation(msg) => ServiceError::ConstraintViolation(msg),
            StoreError::Sqlx(e) => ServiceError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredential(msg) => ServiceError::InvalidCredential(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}
