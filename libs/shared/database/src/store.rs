use async_trait::async_trait;
use uuid::Uuid;

use shared_config::OverlapScope;
use shared_models::{
    Availability, AvailabilityStatus, NewAvailability, NewSchedule, NewUser, Page, Schedule,
    ScheduleDetails, TimeRange, TimeWindow, User, UserRole,
};

use crate::error::DatabaseError;

/// Filter for availability listings. `owner_id: None` spans every professional.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityQuery {
    pub owner_id: Option<Uuid>,
    pub status: AvailabilityStatus,
    pub window: Option<TimeWindow>,
    pub page: Page,
}

impl Default for AvailabilityQuery {
    fn default() -> Self {
        Self {
            owner_id: None,
            status: AvailabilityStatus::Available,
            window: None,
            page: Page::default(),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn list_users(&self, role: Option<UserRole>, page: Page) -> Result<Vec<User>, DatabaseError>;

    /// Fails with `Conflict` when email, CRP or phone is already taken.
    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError>;

    async fn save_user(&self, user: &User) -> Result<User, DatabaseError>;
}

#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    async fn find_availability(&self, id: Uuid) -> Result<Option<Availability>, DatabaseError>;

    /// Ordered by `start_time`, then paged.
    async fn find_availabilities(&self, query: &AvailabilityQuery) -> Result<Vec<Availability>, DatabaseError>;

    async fn exists_overlapping(
        &self,
        owner_id: Uuid,
        range: &TimeRange,
        scope: OverlapScope,
    ) -> Result<bool, DatabaseError>;

    /// Re-checks overlap and inserts as one unit, serialised per owner.
    /// Fails with `Conflict` when an overlapping row won the race.
    async fn insert_availability(
        &self,
        availability: NewAvailability,
        scope: OverlapScope,
    ) -> Result<Availability, DatabaseError>;

    /// Upsert by id.
    async fn save_availability(&self, availability: &Availability) -> Result<Availability, DatabaseError>;

    /// Compare-and-set on status. Fails with `Conflict` when the stored status
    /// is no longer `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: AvailabilityStatus,
        to: AvailabilityStatus,
    ) -> Result<Availability, DatabaseError>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    async fn find_schedule(&self, id: Uuid) -> Result<Option<Schedule>, DatabaseError>;

    /// Schedules where the user is either side, joined with their availability
    /// and filtered on its `start_time`.
    async fn find_schedules_for_user(
        &self,
        user_id: Uuid,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ScheduleDetails>, DatabaseError>;

    /// Inserts the schedule and flips its availability AVAILABLE -> TAKEN
    /// atomically. Fails with `Conflict` if the availability is no longer
    /// AVAILABLE or already has a schedule; nothing is written in that case.
    async fn book(&self, schedule: NewSchedule) -> Result<Schedule, DatabaseError>;

    /// Deletes the schedule and reverts a TAKEN availability to AVAILABLE
    /// atomically. Fails with `NotFound` if the schedule is already gone.
    async fn cancel(&self, schedule_id: Uuid) -> Result<(), DatabaseError>;
}
