//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, users};
use crate::state::AppState;

/// Every route the server exposes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/users/:uid", get(users::get_user))
        .route("/users/slug/:userslug", get(users::get_user_by_slug))
}
