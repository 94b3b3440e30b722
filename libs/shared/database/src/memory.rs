use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::OverlapScope;
use shared_models::{
    Availability, AvailabilityStatus, NewAvailability, NewSchedule, NewUser, Page, Schedule,
    ScheduleDetails, TimeRange, TimeWindow, User, UserRole,
};

use crate::error::DatabaseError;
use crate::store::{AvailabilityQuery, AvailabilityStore, ScheduleStore, UserStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    availabilities: HashMap<Uuid, Availability>,
    schedules: HashMap<Uuid, Schedule>,
}

impl Tables {
    fn has_overlap(&self, owner_id: Uuid, range: &TimeRange, scope: OverlapScope) -> bool {
        self.availabilities.values().any(|existing| {
            existing.owner_id == owner_id
                && existing.status.blocks_overlap(scope)
                && existing.conflicts_with(range)
        })
    }

    fn unique_user_violation(&self, candidate: &User) -> Option<&'static str> {
        self.users
            .values()
            .filter(|existing| existing.id != candidate.id)
            .find_map(|existing| {
                if existing.email == candidate.email {
                    Some("email")
                } else if candidate.crp.is_some() && existing.crp == candidate.crp {
                    Some("crp")
                } else if candidate.phone.is_some() && existing.phone == candidate.phone {
                    Some("phone")
                } else {
                    None
                }
            })
    }
}

/// Process-local store. Every mutation runs under one write lock, which gives
/// the same all-or-nothing guarantees as the Postgres functions.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paged<T>(rows: Vec<T>, page: Page) -> Vec<T> {
    rows.into_iter()
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|user| user.email == email).cloned())
    }

    async fn list_users(&self, role: Option<UserRole>, page: Page) -> Result<Vec<User>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|user| role.map_or(true, |role| user.role == role))
            .cloned()
            .collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(paged(users, page))
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;
        let user = user.into_user(Uuid::new_v4(), Utc::now());

        if let Some(field) = tables.unique_user_violation(&user) {
            warn!("Rejected user insert, duplicate {}", field);
            return Err(DatabaseError::Conflict(format!("{} already registered", field)));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<User, DatabaseError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user.id) {
            return Err(DatabaseError::NotFound(format!("user {}", user.id)));
        }
        if let Some(field) = tables.unique_user_violation(user) {
            return Err(DatabaseError::Conflict(format!("{} already registered", field)));
        }

        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}

#[async_trait]
impl AvailabilityStore for MemoryStore {
    async fn find_availability(&self, id: Uuid) -> Result<Option<Availability>, DatabaseError> {
        Ok(self.tables.read().await.availabilities.get(&id).cloned())
    }

    async fn find_availabilities(&self, query: &AvailabilityQuery) -> Result<Vec<Availability>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Availability> = tables
            .availabilities
            .values()
            .filter(|slot| slot.status == query.status)
            .filter(|slot| query.owner_id.map_or(true, |owner| slot.owner_id == owner))
            .filter(|slot| query.window.map_or(true, |window| window.contains(slot.start_time)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));

        Ok(paged(rows, query.page))
    }

    async fn exists_overlapping(
        &self,
        owner_id: Uuid,
        range: &TimeRange,
        scope: OverlapScope,
    ) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.has_overlap(owner_id, range, scope))
    }

    async fn insert_availability(
        &self,
        availability: NewAvailability,
        scope: OverlapScope,
    ) -> Result<Availability, DatabaseError> {
        let mut tables = self.tables.write().await;

        if tables.has_overlap(availability.owner_id, &availability.range, scope) {
            return Err(DatabaseError::Conflict("overlapping availability".to_string()));
        }

        let availability = availability.into_availability(Uuid::new_v4(), Utc::now());
        debug!("Stored availability {} for owner {}", availability.id, availability.owner_id);
        tables.availabilities.insert(availability.id, availability.clone());
        Ok(availability)
    }

    async fn save_availability(&self, availability: &Availability) -> Result<Availability, DatabaseError> {
        let mut tables = self.tables.write().await;
        tables.availabilities.insert(availability.id, availability.clone());
        Ok(availability.clone())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AvailabilityStatus,
        to: AvailabilityStatus,
    ) -> Result<Availability, DatabaseError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .availabilities
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("availability {}", id)))?;

        if slot.status != from {
            return Err(DatabaseError::Conflict(format!(
                "availability {} is {}, expected {}",
                id,
                slot.status.as_str(),
                from.as_str()
            )));
        }

        slot.status = to;
        Ok(slot.clone())
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn find_schedule(&self, id: Uuid) -> Result<Option<Schedule>, DatabaseError> {
        Ok(self.tables.read().await.schedules.get(&id).cloned())
    }

    async fn find_schedules_for_user(
        &self,
        user_id: Uuid,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ScheduleDetails>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<ScheduleDetails> = tables
            .schedules
            .values()
            .filter(|schedule| schedule.involves(user_id))
            .filter_map(|schedule| {
                let availability = tables.availabilities.get(&schedule.availability_id)?;
                Some(ScheduleDetails {
                    schedule: schedule.clone(),
                    availability: availability.clone(),
                })
            })
            .filter(|details| window.map_or(true, |window| window.contains(details.availability.start_time)))
            .collect();
        rows.sort_by(|a, b| a.availability.start_time.cmp(&b.availability.start_time));

        Ok(rows)
    }

    async fn book(&self, schedule: NewSchedule) -> Result<Schedule, DatabaseError> {
        let mut tables = self.tables.write().await;

        let already_booked = tables
            .schedules
            .values()
            .any(|existing| existing.availability_id == schedule.availability_id);
        if already_booked {
            return Err(DatabaseError::Conflict("This schedule already exists".to_string()));
        }

        let slot = tables
            .availabilities
            .get_mut(&schedule.availability_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("availability {}", schedule.availability_id)))?;
        if slot.status != AvailabilityStatus::Available {
            return Err(DatabaseError::Conflict(format!(
                "availability {} is {}",
                slot.id,
                slot.status.as_str()
            )));
        }
        slot.status = AvailabilityStatus::Taken;

        let schedule = schedule.into_schedule(Uuid::new_v4(), Utc::now());
        tables.schedules.insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn cancel(&self, schedule_id: Uuid) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;

        let schedule = tables
            .schedules
            .remove(&schedule_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("schedule {}", schedule_id)))?;

        if let Some(slot) = tables.availabilities.get_mut(&schedule.availability_id) {
            if slot.status == AvailabilityStatus::Taken {
                slot.status = AvailabilityStatus::Available;
            }
        }

        Ok(())
    }
}
