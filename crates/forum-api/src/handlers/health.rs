//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use forum_core::KeyValueStore;
use forum_service::dto::{HealthResponse, ReadinessResponse};
use tracing::warn;

use crate::state::AppState;

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// GET /health/ready
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let store_healthy = match state.service_context().store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            false
        }
    };

    let status = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse::ready(store_healthy)))
}
