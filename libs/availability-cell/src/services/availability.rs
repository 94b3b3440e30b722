use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use security_cell::AuthorizationPolicy;
use shared_config::AppConfig;
use shared_database::{AvailabilityQuery, AvailabilityStore, DatabaseError, UserStore};
use shared_models::{
    Availability, AvailabilityStatus, NewAvailability, Page, TimeRange, UserResponse,
};
use shared_utils::AppState;

use crate::models::{
    AvailabilityError, AvailabilityWithOwner, ChangeStatusRequest, CreateAvailabilityRequest,
    ListAvailabilitiesQuery,
};

pub struct AvailabilityService {
    users: Arc<dyn UserStore>,
    availabilities: Arc<dyn AvailabilityStore>,
    config: Arc<AppConfig>,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            users: state.users.clone(),
            availabilities: state.availabilities.clone(),
            config: state.config.clone(),
        }
    }

    /// Publishes a slot for `owner_id`. The range is checked before the caller's role.
    pub async fn create_availability(
        &self,
        owner_id: Uuid,
        request: CreateAvailabilityRequest,
    ) -> Result<Availability, AvailabilityError> {
        debug!("Creating availability for {}: {} - {}", owner_id, request.start_time, request.end_time);

        let range = TimeRange::new(request.start_time, request.end_time)
            .map_err(|_| AvailabilityError::InvalidRange)?;

        let owner = AuthorizationPolicy::require_exists(self.users.find_user(owner_id).await?, "User")?;
        AuthorizationPolicy::require_professional(&owner)?;
        AuthorizationPolicy::require_verified(&owner)?;

        let status = request.status.unwrap_or_default();
        if status == AvailabilityStatus::Taken {
            return Err(AvailabilityError::InvalidInitialStatus);
        }

        let scope = self.config.overlap_scope;
        if self.availabilities.exists_overlapping(owner_id, &range, scope).await? {
            warn!("Availability for {} overlaps an existing one", owner_id);
            return Err(AvailabilityError::Overlap);
        }

        // The store re-checks under its own lock; a concurrent create can still lose here.
        let draft = NewAvailability { owner_id, range, status };
        let created = self
            .availabilities
            .insert_availability(draft, scope)
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(msg) => {
                    warn!("Availability insert lost an overlap race: {}", msg);
                    AvailabilityError::Overlap
                }
                other => {
                    error!("Failed to store availability: {}", other);
                    AvailabilityError::Database(other)
                }
            })?;

        info!("Availability {} created for {}", created.id, owner_id);
        Ok(created)
    }

    pub async fn change_status(
        &self,
        acting_user_id: Uuid,
        request: ChangeStatusRequest,
    ) -> Result<Availability, AvailabilityError> {
        debug!(
            "User {} changing availability {} to {}",
            acting_user_id, request.availability_id, request.status
        );

        let user = AuthorizationPolicy::require_exists(self.users.find_user(acting_user_id).await?, "User")?;
        let availability = self
            .availabilities
            .find_availability(request.availability_id)
            .await?
            .ok_or(AvailabilityError::NotFound)?;

        AuthorizationPolicy::require_professional(&user)?;
        AuthorizationPolicy::require_verified(&user)?;
        AuthorizationPolicy::require_owner(&availability, user.id)?;

        let from = availability.status;
        let to = request.status;

        let updated = if self.config.strict_status_transitions {
            if !from.can_transition_to(to) {
                warn!("Rejected transition {} -> {} on {}", from, to, availability.id);
                return Err(AvailabilityError::InvalidTransition { from, to });
            }

            self.availabilities
                .transition_status(availability.id, from, to)
                .await
                .map_err(|e| match e {
                    DatabaseError::Conflict(_) => AvailabilityError::StaleStatus,
                    DatabaseError::NotFound(_) => AvailabilityError::NotFound,
                    other => AvailabilityError::Database(other),
                })?
        } else {
            let overwritten = Availability { status: to, ..availability };
            self.availabilities.save_availability(&overwritten).await?
        };

        info!("Availability {} moved {} -> {}", updated.id, from, updated.status);
        Ok(updated)
    }

    /// Lists one status page ordered by start time, each slot with its owner.
    pub async fn list_availabilities(
        &self,
        query: ListAvailabilitiesQuery,
    ) -> Result<Vec<AvailabilityWithOwner>, AvailabilityError> {
        let store_query = AvailabilityQuery {
            owner_id: query.professional_id,
            status: query.status.unwrap_or_default(),
            window: query.time_filter.unwrap_or_default().window(),
            page: Page::new(query.skip, query.limit),
        };
        debug!("Listing availabilities: {:?}", store_query);

        let availabilities = self.availabilities.find_availabilities(&store_query).await?;

        let mut owners: HashMap<Uuid, Option<UserResponse>> = HashMap::new();
        let mut listed = Vec::with_capacity(availabilities.len());
        for availability in availabilities {
            if !owners.contains_key(&availability.owner_id) {
                let owner = self.users.find_user(availability.owner_id).await?.map(UserResponse::from);
                owners.insert(availability.owner_id, owner);
            }
            let user = owners.get(&availability.owner_id).cloned().flatten();
            listed.push(AvailabilityWithOwner { availability, user });
        }

        Ok(listed)
    }
}
