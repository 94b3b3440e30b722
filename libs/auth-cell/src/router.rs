use std::sync::Arc;

use axum::{routing::post, Router};

use shared_utils::AppState;

use crate::handlers;

/// Both routes authenticate from their own bearer token, so no middleware.
pub fn auth_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/validate", post(handlers::validate))
        .route("/refresh", post(handlers::refresh))
        .with_state(state)
}
