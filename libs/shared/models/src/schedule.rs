use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::Availability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub availability_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.professional_id == user_id || self.patient_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub professional_id: Uuid,
    pub patient_id: Uuid,
    pub availability_id: Uuid,
}

impl NewSchedule {
    pub fn for_availability(availability: &Availability, patient_id: Uuid) -> Self {
        Self {
            professional_id: availability.owner_id,
            patient_id,
            availability_id: availability.id,
        }
    }

    pub fn into_schedule(self, id: Uuid, created_at: DateTime<Utc>) -> Schedule {
        Schedule {
            id,
            professional_id: self.professional_id,
            patient_id: self.patient_id,
            availability_id: self.availability_id,
            created_at,
        }
    }
}

/// A schedule joined with the availability it occupies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDetails {
    #[serde(flatten)]
    pub schedule: Schedule,
    pub availability: Availability,
}
