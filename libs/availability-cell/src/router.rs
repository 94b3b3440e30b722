use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;
use shared_utils::AppState;

use crate::handlers;

pub fn availability_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_availabilities).post(handlers::create_availability))
        .route("/change-status", post(handlers::change_status))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
