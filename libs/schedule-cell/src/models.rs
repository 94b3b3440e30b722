use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use security_cell::PolicyError;
use shared_database::DatabaseError;
use shared_models::error::AppError;
use shared_models::{AvailabilityStatus, ScheduleDetails, TimeFilter, UserResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub availability_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleResponse {
    pub schedule_id: Uuid,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleQuery {
    pub time_filter: Option<TimeFilter>,
}

/// A schedule as shown to either side: the slot's times and status, plus the
/// professional who owns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub availability_id: Uuid,
    pub status: AvailabilityStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserResponse>,
}

impl ScheduleResponse {
    pub fn new(details: ScheduleDetails, professional: Option<UserResponse>) -> Self {
        let ScheduleDetails { schedule, availability } = details;
        Self {
            id: schedule.id,
            professional_id: schedule.professional_id,
            patient_id: schedule.patient_id,
            availability_id: schedule.availability_id,
            status: availability.status,
            start_time: availability.start_time,
            end_time: availability.end_time,
            created_at: schedule.created_at,
            user: professional,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Availability not found")]
    AvailabilityNotFound,

    #[error("This availability cannot be scheduled.")]
    NotSchedulable,

    #[error("This schedule already exists")]
    AlreadyBooked,

    #[error("Schedule not found")]
    NotFound,

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::AvailabilityNotFound | ScheduleError::NotFound => AppError::NotFound(err.to_string()),
            ScheduleError::NotSchedulable => AppError::BadRequest(err.to_string()),
            ScheduleError::AlreadyBooked => AppError::Conflict(err.to_string()),
            ScheduleError::Policy(policy) => policy.into(),
            ScheduleError::Database(db) => AppError::Database(db.to_string()),
        }
    }
}
