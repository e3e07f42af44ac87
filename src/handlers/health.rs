//! Health and readiness endpoints.
//!
//! Both are mounted outside the access guard so load balancers and
//! orchestrators can probe the service from any address.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use tracing::instrument;

use crate::models::HealthResponse;
use crate::state::AppState;

/// Health check endpoint.
///
/// # Response Body
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "guard": "ip-guard",
///   "allowed_ranges": 2,
///   "uptime_seconds": 3600,
///   "timestamp": "2024-01-15T10:30:00Z"
/// }
/// ```
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        guard: state.config.guard_name.clone(),
        allowed_ranges: state.config.guard.source_range.len(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint.
///
/// The guard has no external dependencies, so a running server is ready.
pub async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
