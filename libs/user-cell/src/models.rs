use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use security_cell::{PasswordError, PolicyError};
use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_models::UserRole;

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub crp: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Only these fields are editable; id, email and CRP are fixed at registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<UserRole>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{0}")]
    Validation(String),

    #[error("Email or CRP already registered")]
    AlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Token error: {0}")]
    Token(String),

    #[error("Password error: {0}")]
    Password(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<PasswordError> for UserError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort(_) => UserError::Validation(err.to_string()),
            PasswordError::Hash(msg) => UserError::Password(msg),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => AppError::ValidationError(msg),
            UserError::AlreadyRegistered => AppError::Conflict(err.to_string()),
            UserError::InvalidCredentials => AppError::BadRequest(err.to_string()),
            UserError::NotFound => AppError::NotFound(err.to_string()),
            UserError::Policy(policy) => policy.into(),
            UserError::Token(msg) | UserError::Password(msg) => AppError::Internal(msg),
            UserError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
