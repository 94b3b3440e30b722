use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_models::Availability;
use shared_utils::AppState;

use crate::models::{
    AvailabilityWithOwner, ChangeStatusRequest, CreateAvailabilityRequest, CreateAvailabilityResponse,
    ListAvailabilitiesQuery,
};
use crate::services::AvailabilityService;

#[axum::debug_handler]
pub async fn create_availability(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateAvailabilityRequest>,
) -> Result<(StatusCode, Json<CreateAvailabilityResponse>), AppError> {
    let availability = AvailabilityService::new(&state)
        .create_availability(user.id, request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAvailabilityResponse { availability_id: availability.id }),
    ))
}

#[axum::debug_handler]
pub async fn list_availabilities(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<ListAvailabilitiesQuery>,
) -> Result<Json<Vec<AvailabilityWithOwner>>, AppError> {
    let availabilities = AvailabilityService::new(&state).list_availabilities(query).await?;
    Ok(Json(availabilities))
}

#[axum::debug_handler]
pub async fn change_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<Availability>, AppError> {
    let availability = AvailabilityService::new(&state).change_status(user.id, request).await?;
    Ok(Json(availability))
}
