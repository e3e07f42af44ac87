//! Shared application state for Axum handlers.
//!
//! The access guard keeps its own immutable allow-list; handlers only need
//! read access to the configuration it was built from.

use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Shared application state, cloned per request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Timestamp when the application started
    pub started_at: Instant,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            started_at: Instant::now(),
            config: Arc::new(config),
        }
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
