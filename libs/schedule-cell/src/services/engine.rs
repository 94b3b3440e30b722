use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use security_cell::AuthorizationPolicy;
use shared_database::{AvailabilityStore, DatabaseError, ScheduleStore, UserStore};
use shared_models::{AvailabilityStatus, NewSchedule, Schedule, TimeFilter, TimeWindow, UserResponse};
use shared_utils::AppState;

use crate::models::{ScheduleError, ScheduleResponse};

/// Books and releases availabilities. The preconditions here are a fast path;
/// the store's atomic `book`/`cancel` decide every race.
pub struct SchedulingEngine {
    users: Arc<dyn UserStore>,
    availabilities: Arc<dyn AvailabilityStore>,
    schedules: Arc<dyn ScheduleStore>,
}

impl SchedulingEngine {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            availabilities: state.availabilities.clone(),
            schedules: state.schedules.clone(),
        }
    }

    pub async fn book_availability(&self, availability_id: Uuid, patient_id: Uuid) -> Result<Schedule, ScheduleError> {
        debug!("Patient {} booking availability {}", patient_id, availability_id);

        let availability = self
            .availabilities
            .find_availability(availability_id)
            .await?
            .ok_or(ScheduleError::AvailabilityNotFound)?;

        if availability.status != AvailabilityStatus::Available {
            warn!("Availability {} is {}, cannot book", availability.id, availability.status);
            return Err(ScheduleError::NotSchedulable);
        }

        let patient = AuthorizationPolicy::require_exists(self.users.find_user(patient_id).await?, "User")?;
        AuthorizationPolicy::require_patient(&patient)?;

        let draft = NewSchedule::for_availability(&availability, patient.id);
        let schedule = self.schedules.book(draft).await.map_err(|e| match e {
            DatabaseError::Conflict(msg) => {
                warn!("Booking of {} lost the race: {}", availability_id, msg);
                ScheduleError::AlreadyBooked
            }
            DatabaseError::NotFound(_) => ScheduleError::AvailabilityNotFound,
            other => {
                error!("Failed to book availability {}: {}", availability_id, other);
                ScheduleError::Database(other)
            }
        })?;

        info!("Schedule {} created, availability {} is TAKEN", schedule.id, availability_id);
        Ok(schedule)
    }

    /// Only the booking patient may cancel. The schedule row is removed and a
    /// TAKEN slot goes back to AVAILABLE in the same unit of work.
    pub async fn cancel_schedule(&self, schedule_id: Uuid, acting_user_id: Uuid) -> Result<(), ScheduleError> {
        debug!("User {} cancelling schedule {}", acting_user_id, schedule_id);

        let schedule = self
            .schedules
            .find_schedule(schedule_id)
            .await?
            .ok_or(ScheduleError::NotFound)?;

        let user = AuthorizationPolicy::require_exists(self.users.find_user(acting_user_id).await?, "User")?;
        AuthorizationPolicy::require_booking_patient(&schedule, user.id)?;

        self.schedules.cancel(schedule.id).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ScheduleError::NotFound,
            other => {
                error!("Failed to cancel schedule {}: {}", schedule_id, other);
                ScheduleError::Database(other)
            }
        })?;

        info!("Schedule {} cancelled", schedule_id);
        Ok(())
    }

    /// Resolves `time_filter` against the local clock, then lists.
    pub async fn get_schedules(&self, user_id: Uuid, time_filter: TimeFilter) -> Result<Vec<ScheduleResponse>, ScheduleError> {
        debug!("Fetching schedules for {} ({:?})", user_id, time_filter);
        self.get_schedules_in(user_id, time_filter.window()).await
    }

    /// Schedules whose slot starts inside `window`; `None` lists all of them.
    pub async fn get_schedules_in(
        &self,
        user_id: Uuid,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ScheduleResponse>, ScheduleError> {
        let rows = self.schedules.find_schedules_for_user(user_id, window).await?;

        let mut professionals: HashMap<Uuid, Option<UserResponse>> = HashMap::new();
        let mut responses = Vec::with_capacity(rows.len());
        for details in rows {
            let professional_id = details.schedule.professional_id;
            if !professionals.contains_key(&professional_id) {
                let professional = self.users.find_user(professional_id).await?.map(UserResponse::from);
                professionals.insert(professional_id, professional);
            }
            let professional = professionals.get(&professional_id).cloned().flatten();
            responses.push(ScheduleResponse::new(details, professional));
        }

        Ok(responses)
    }
}
