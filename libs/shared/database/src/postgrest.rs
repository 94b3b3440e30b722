use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::{AppConfig, OverlapScope};
use shared_models::{
    Availability, AvailabilityStatus, NewAvailability, NewSchedule, NewUser, Page, Schedule,
    ScheduleDetails, TimeRange, TimeWindow, User, UserRole,
};

use crate::error::DatabaseError;
use crate::store::{AvailabilityQuery, AvailabilityStore, ScheduleStore, UserStore};
use crate::supabase::{representation_headers, upsert_headers, SupabaseClient};

const USERS: &str = "/rest/v1/users";
const AVAILABILITIES: &str = "/rest/v1/availabilities";
const SCHEDULES: &str = "/rest/v1/schedule";

/// Store backed by the Supabase REST API. Multi-row invariants go through the
/// Postgres functions in `migrations/0001_init.sql`.
pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(config: &AppConfig) -> Self {
        Self { client: SupabaseClient::new(config) }
    }

    async fn first<T>(&self, path: &str) -> Result<Option<T>, DatabaseError>
    where T: serde::de::DeserializeOwned {
        let rows: Vec<T> = self.client.request(Method::GET, path, None).await?;
        Ok(rows.into_iter().next())
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    urlencoding::encode(&value.to_rfc3339_opts(SecondsFormat::Micros, true)).into_owned()
}

fn page_params(page: Page) -> String {
    format!("offset={}&limit={}", page.skip, page.limit)
}

#[async_trait]
impl UserStore for SupabaseStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        self.first(&format!("{}?id=eq.{}", USERS, id)).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.first(&format!("{}?email=eq.{}", USERS, urlencoding::encode(email))).await
    }

    async fn list_users(&self, role: Option<UserRole>, page: Page) -> Result<Vec<User>, DatabaseError> {
        let mut path = format!("{}?order=created_at.asc,id.asc&{}", USERS, page_params(page));
        if let Some(role) = role {
            path.push_str(&format!("&role=eq.{}", role.as_str()));
        }
        self.client.request(Method::GET, &path, None).await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, DatabaseError> {
        let body = serde_json::to_value(&user)?;
        let rows: Vec<User> = self
            .client
            .request_with_headers(Method::POST, USERS, Some(body), Some(representation_headers()))
            .await?;

        let user = rows
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::Api { status: 201, message: "insert returned no rows".to_string() })?;
        info!("Registered user {} as {}", user.id, user.role.as_str());
        Ok(user)
    }

    async fn save_user(&self, user: &User) -> Result<User, DatabaseError> {
        let body = json!({
            "name": user.name,
            "email": user.email,
            "password_hash": user.password_hash,
            "role": user.role,
            "status": user.status,
            "crp": user.crp,
            "phone": user.phone,
            "bio": user.bio,
            "image_url": user.image_url,
        });
        let path = format!("{}?id=eq.{}", USERS, user.id);
        let rows: Vec<User> = self
            .client
            .request_with_headers(Method::PATCH, &path, Some(body), Some(representation_headers()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::NotFound(format!("user {}", user.id)))
    }
}

#[async_trait]
impl AvailabilityStore for SupabaseStore {
    async fn find_availability(&self, id: Uuid) -> Result<Option<Availability>, DatabaseError> {
        self.first(&format!("{}?id=eq.{}", AVAILABILITIES, id)).await
    }

    async fn find_availabilities(&self, query: &AvailabilityQuery) -> Result<Vec<Availability>, DatabaseError> {
        let mut filters = vec![format!("status=eq.{}", query.status.as_str())];
        if let Some(owner_id) = query.owner_id {
            filters.push(format!("owner_id=eq.{}", owner_id));
        }
        if let Some(window) = query.window {
            filters.push(format!("start_time=gte.{}", timestamp(window.start)));
            filters.push(format!("start_time=lt.{}", timestamp(window.end)));
        }

        let path = format!(
            "{}?{}&order=start_time.asc,id.asc&{}",
            AVAILABILITIES,
            filters.join("&"),
            page_params(query.page)
        );
        self.client.request(Method::GET, &path, None).await
    }

    async fn exists_overlapping(
        &self,
        owner_id: Uuid,
        range: &TimeRange,
        scope: OverlapScope,
    ) -> Result<bool, DatabaseError> {
        // With start < end guaranteed, identical intervals are a subset of strict intersection.
        let mut path = format!(
            "{}?select=id&owner_id=eq.{}&start_time=lt.{}&end_time=gt.{}&limit=1",
            AVAILABILITIES,
            owner_id,
            timestamp(range.end()),
            timestamp(range.start())
        );
        if scope == OverlapScope::Active {
            path.push_str("&status=in.(AVAILABLE,TAKEN)");
        }

        let rows: Vec<Value> = self.client.request(Method::GET, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_availability(
        &self,
        availability: NewAvailability,
        scope: OverlapScope,
    ) -> Result<Availability, DatabaseError> {
        let args = json!({
            "p_owner_id": availability.owner_id,
            "p_start_time": availability.range.start(),
            "p_end_time": availability.range.end(),
            "p_status": availability.status,
            "p_active_only": scope == OverlapScope::Active,
        });

        let created: Availability = self.client.rpc("create_availability", args).await?;
        debug!("Created availability {} for owner {}", created.id, created.owner_id);
        Ok(created)
    }

    async fn save_availability(&self, availability: &Availability) -> Result<Availability, DatabaseError> {
        let body = serde_json::to_value(availability)?;
        let rows: Vec<Availability> = self
            .client
            .request_with_headers(Method::POST, AVAILABILITIES, Some(body), Some(upsert_headers()))
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DatabaseError::Api { status: 201, message: "upsert returned no rows".to_string() })
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AvailabilityStatus,
        to: AvailabilityStatus,
    ) -> Result<Availability, DatabaseError> {
        let path = format!("{}?id=eq.{}&status=eq.{}", AVAILABILITIES, id, from.as_str());
        let rows: Vec<Availability> = self
            .client
            .request_with_headers(Method::PATCH, &path, Some(json!({ "status": to })), Some(representation_headers()))
            .await?;

        if let Some(updated) = rows.into_iter().next() {
            return Ok(updated);
        }

        // Nothing matched: either the row is gone or its status moved underneath us.
        match self.find_availability(id).await? {
            None => Err(DatabaseError::NotFound(format!("availability {}", id))),
            Some(current) => Err(DatabaseError::Conflict(format!(
                "availability {} is {}, expected {}",
                id,
                current.status.as_str(),
                from.as_str()
            ))),
        }
    }
}

#[async_trait]
impl ScheduleStore for SupabaseStore {
    async fn find_schedule(&self, id: Uuid) -> Result<Option<Schedule>, DatabaseError> {
        self.first(&format!("{}?id=eq.{}", SCHEDULES, id)).await
    }

    async fn find_schedules_for_user(
        &self,
        user_id: Uuid,
        window: Option<TimeWindow>,
    ) -> Result<Vec<ScheduleDetails>, DatabaseError> {
        let mut path = format!(
            "{}?select=*,availability:availabilities!inner(*)&or=(professional_id.eq.{},patient_id.eq.{})&order=created_at.asc",
            SCHEDULES, user_id, user_id
        );
        if let Some(window) = window {
            path.push_str(&format!(
                "&availability.start_time=gte.{}&availability.start_time=lt.{}",
                timestamp(window.start),
                timestamp(window.end)
            ));
        }

        let mut rows: Vec<ScheduleDetails> = self.client.request(Method::GET, &path, None).await?;
        rows.sort_by(|a, b| a.availability.start_time.cmp(&b.availability.start_time));
        Ok(rows)
    }

    async fn book(&self, schedule: NewSchedule) -> Result<Schedule, DatabaseError> {
        let args = json!({
            "p_availability_id": schedule.availability_id,
            "p_patient_id": schedule.patient_id,
            "p_professional_id": schedule.professional_id,
        });

        let booked: Schedule = self.client.rpc("book_availability", args).await?;
        info!("Booked availability {} as schedule {}", booked.availability_id, booked.id);
        Ok(booked)
    }

    async fn cancel(&self, schedule_id: Uuid) -> Result<(), DatabaseError> {
        let _: Value = self
            .client
            .rpc("cancel_schedule", json!({ "p_schedule_id": schedule_id }))
            .await?;
        info!("Cancelled schedule {}", schedule_id);
        Ok(())
    }
}
