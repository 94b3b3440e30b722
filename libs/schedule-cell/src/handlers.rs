use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::AppState;

use crate::models::{CreateScheduleRequest, CreateScheduleResponse, ScheduleQuery, ScheduleResponse};
use crate::services::SchedulingEngine;

#[axum::debug_handler]
pub async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<CreateScheduleResponse>), AppError> {
    let schedule = SchedulingEngine::new(&state)
        .book_availability(request.availability_id, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateScheduleResponse { schedule_id: schedule.id })))
}

#[axum::debug_handler]
pub async fn get_schedules(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Vec<ScheduleResponse>>, AppError> {
    let schedules = SchedulingEngine::new(&state)
        .get_schedules(user.id, query.time_filter.unwrap_or_default())
        .await?;
    Ok(Json(schedules))
}

#[axum::debug_handler]
pub async fn cancel_schedule(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(schedule_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    SchedulingEngine::new(&state).cancel_schedule(schedule_id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
