use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use security_cell::PolicyError;
use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_models::{Availability, AvailabilityStatus, TimeFilter, UserResponse};

pub const OVERLAP_MESSAGE: &str =
    "start_time and end_time are conflicting with another availability for this user.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityRequest {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: Option<AvailabilityStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvailabilityResponse {
    pub availability_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    pub availability_id: Uuid,
    pub status: AvailabilityStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListAvailabilitiesQuery {
    pub professional_id: Option<Uuid>,
    pub status: Option<AvailabilityStatus>,
    pub time_filter: Option<TimeFilter>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

/// An availability with its owner embedded for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWithOwner {
    #[serde(flatten)]
    pub availability: Availability,
    pub user: Option<UserResponse>,
}

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("start_time must be before end_time")]
    InvalidRange,

    #[error("An availability can only become TAKEN through a booking")]
    InvalidInitialStatus,

    #[error("{}", OVERLAP_MESSAGE)]
    Overlap,

    #[error("Availability not found")]
    NotFound,

    #[error("Cannot change availability status from {from} to {to}")]
    InvalidTransition { from: AvailabilityStatus, to: AvailabilityStatus },

    #[error("Availability status changed concurrently")]
    StaleStatus,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidRange | AvailabilityError::InvalidInitialStatus => {
                AppError::ValidationError(err.to_string())
            }
            AvailabilityError::Overlap | AvailabilityError::StaleStatus => AppError::Conflict(err.to_string()),
            AvailabilityError::NotFound => AppError::NotFound(err.to_string()),
            AvailabilityError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            AvailabilityError::Policy(policy) => policy.into(),
            AvailabilityError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn overlap_renders_the_published_message_as_conflict() {
        assert_eq!(AvailabilityError::Overlap.to_string(), OVERLAP_MESSAGE);

        let app_error = AppError::from(AvailabilityError::Overlap);
        assert_eq!(app_error.status_code(), StatusCode::CONFLICT);
        assert_eq!(app_error.to_string(), format!("Conflict: {}", OVERLAP_MESSAGE));
        assert_eq!(app_error.into_response().status(), StatusCode::CONFLICT);
    }
}
