use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};

use shared_models::auth::{AuthUser, TokenPair};
use shared_models::error::AppError;
use shared_models::{Page, UserResponse};
use shared_utils::AppState;

use crate::models::{ListUsersQuery, LoginRequest, RegisterRequest, UpdateUserRequest, UserQuery};
use crate::services::UserService;

// ==============================================================================
// PUBLIC HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = UserService::new(&state).register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let tokens = UserService::new(&state).login(request).await?;
    Ok(Json(tokens))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let found = UserService::new(&state).get_user(query.user_id, user.id).await?;
    Ok(Json(found))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(_user): Extension<AuthUser>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let page = Page::new(query.skip, query.limit);
    let users = UserService::new(&state).list_users(query.role, page).await?;
    Ok(Json(users))
}

#[axum::debug_handler]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let updated = UserService::new(&state).update_user(user.id, request).await?;
    Ok(Json(updated))
}

/// Marks a professional READY. Any authenticated caller may verify any
/// professional, themselves included; there is no administrator role to gate it.
#[axum::debug_handler]
pub async fn verify_crp(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserResponse>, AppError> {
    let verified = UserService::new(&state).verify_crp(query.user_id, user.id).await?;
    Ok(Json(verified))
}
