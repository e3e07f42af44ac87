//! # IP Guard
//!
//! CIDR allow-list access control for Axum and Tower services, with
//! proxy-aware client address resolution.
//!
//! - **Allow-list**: IPv4/IPv6 CIDR ranges, parsed once, all-or-nothing
//! - **Trust policy**: socket peer, `X-Forwarded-For`, or a configured
//!   real-IP header
//! - **Fail closed**: unparseable or missing addresses are denied
//! - **Observability**: structured logging, Prometheus decision counters
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace)                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AccessGuardLayer (TrustPolicy → AllowList)  ── 403 / 400   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handlers                                                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::net::SocketAddr;
//!
//! use axum::{Router, routing::get};
//! use ip_guard::{AccessGuardLayer, GuardConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let guard = AccessGuardLayer::new(&GuardConfig {
//!         source_range: vec!["10.0.0.0/8".to_string()],
//!         ..GuardConfig::default()
//!     })?;
//!
//!     let app = Router::new()
//!         .route("/internal", get(|| async { "hello" }))
//!         .route_layer(guard);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Behind a Proxy
//!
//! ```bash
//! ALLOWED_IPS=10.0.0.0/8 BEHIND_PROXY=true X_REAL_IP_HEADER=X-Real-IP cargo run
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

// Re-exports for convenience
pub use config::{Config, GuardConfig};
pub use error::{AppError, AppResult, GuardError};
pub use middleware::{AccessGuardLayer, AllowList, Decision, TrustPolicy};
pub use routes::build_router;
pub use state::AppState;
