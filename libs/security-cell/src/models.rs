use thiserror::Error;

use shared_models::error::AppError;

/// Failures of the authorization checks. Existence is checked before permission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),
}

impl From<PolicyError> for AppError {
    fn from(err: PolicyError) -> Self {
        match err {
            PolicyError::NotFound(msg) => AppError::NotFound(msg),
            PolicyError::Forbidden(msg) => AppError::Forbidden(msg),
        }
    }
}

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password must be at least {0} characters long")]
    TooShort(usize),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl From<argon2::password_hash::Error> for PasswordError {
    fn from(err: argon2::password_hash::Error) -> Self {
        PasswordError::Hash(err.to_string())
    }
}
