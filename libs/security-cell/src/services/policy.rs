use tracing::warn;
use uuid::Uuid;

use shared_models::{Availability, Schedule, User};

use crate::models::PolicyError;

pub const FORBIDDEN_ACTION: &str = "This user can not perform this action.";

/// Role, verification and ownership checks. Each operation composes the ones
/// it needs, in order; none of them touch storage.
pub struct AuthorizationPolicy;

impl AuthorizationPolicy {
    pub fn require_exists<T>(entity: Option<T>, what: &str) -> Result<T, PolicyError> {
        entity.ok_or_else(|| PolicyError::NotFound(format!("{} not found", what)))
    }

    pub fn require_professional(user: &User) -> Result<(), PolicyError> {
        if !user.is_professional() {
            warn!("User {} is {}, professional required", user.id, user.role.as_str());
            return Err(PolicyError::Forbidden(FORBIDDEN_ACTION.to_string()));
        }
        Ok(())
    }

    pub fn require_patient(user: &User) -> Result<(), PolicyError> {
        if !user.is_patient() {
            warn!("User {} is {}, patient required", user.id, user.role.as_str());
            return Err(PolicyError::Forbidden(FORBIDDEN_ACTION.to_string()));
        }
        Ok(())
    }

    pub fn require_verified(user: &User) -> Result<(), PolicyError> {
        if !user.is_ready() {
            warn!("User {} is {}, cannot act yet", user.id, user.status.as_str());
            return Err(PolicyError::Forbidden(FORBIDDEN_ACTION.to_string()));
        }
        Ok(())
    }

    pub fn require_owner(availability: &Availability, user_id: Uuid) -> Result<(), PolicyError> {
        if availability.owner_id != user_id {
            warn!("User {} does not own availability {}", user_id, availability.id);
            return Err(PolicyError::Forbidden(FORBIDDEN_ACTION.to_string()));
        }
        Ok(())
    }

    /// Only the patient who booked a schedule may act on it.
    pub fn require_booking_patient(schedule: &Schedule, user_id: Uuid) -> Result<(), PolicyError> {
        if schedule.patient_id != user_id {
            warn!("User {} is not the patient of schedule {}", user_id, schedule.id);
            return Err(PolicyError::Forbidden(
                "You are not allowed to delete this schedule".to_string(),
            ));
        }
        Ok(())
    }
}
