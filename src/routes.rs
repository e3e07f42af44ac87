//! Application routing configuration with middleware stack.
//!
//! # Middleware Stack
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │   Request ID     │ ← Sets / propagates X-Request-Id
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          │
//!          ▼
//! ┌──────────────────┐
//! │   Access Guard   │ ← 403 / 400 (guarded routes only)
//! └────────┬─────────┘
//!          │
//!          ▼
//!      Handler
//! ```
//!
//! # Route Groups
//!
//! - `/health`, `/ready` - Probes, never guarded
//! - `/whoami` - Guarded by the IP allow-list

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::error::GuardError;
use crate::handlers;
use crate::middleware::{AccessGuardLayer, propagate_request_id_layer, set_request_id_layer};
use crate::state::AppState;

/// Build the application router with all routes and middleware configured.
///
/// Serve the result with `into_make_service_with_connect_info::<SocketAddr>()`
/// so the guard can see the connection address.
///
/// # Errors
///
/// Returns `GuardError` if the allow-list or trust policy in the
/// configuration is invalid.
pub fn build_router(state: AppState) -> Result<Router, GuardError> {
    let config = &state.config;

    let guard = AccessGuardLayer::named(config.guard_name.clone(), &config.guard)?;

    let guarded = Router::new()
        .route("/whoami", get(handlers::whoami))
        .route_layer(guard);

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .merge(guarded)
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        );

    Ok(router.with_state(state))
}
