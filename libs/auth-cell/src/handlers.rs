use std::sync::Arc;

use axum::{extract::State, Json};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::{debug, error, info};

use shared_models::auth::{TokenPair, TokenResponse};
use shared_models::error::AppError;
use shared_utils::jwt::{issue_pair, validate_refresh_token, validate_token};
use shared_utils::AppState;

#[axum::debug_handler]
pub async fn validate(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let user = validate_token(auth.token(), &state.config.jwt_secret).map_err(AppError::Auth)?;

    Ok(Json(TokenResponse {
        valid: true,
        user_id: user.id,
        email: user.email,
        role: user.role,
    }))
}

/// Trades a refresh token for a fresh pair. The user must still exist.
#[axum::debug_handler]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<TokenPair>, AppError> {
    debug!("Refreshing token");

    let principal = validate_refresh_token(auth.token(), &state.config.jwt_secret).map_err(AppError::Auth)?;

    let user = state
        .users
        .find_user(principal.id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::Auth("User no longer exists".to_string()))?;

    let pair = issue_pair(&user, &state.config).map_err(|e| {
        error!("Failed to issue tokens: {}", e);
        AppError::Internal(e)
    })?;

    info!("Issued refreshed tokens for user {}", user.id);
    Ok(Json(pair))
}
