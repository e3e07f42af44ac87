//! Prometheus metrics for the access guard.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `ip_guard_decisions_total` - Guard decisions (labels: guard, decision)
//!   where decision is `allowed`, `forbidden`, or `bad_request`
//!
//! ## Gauges
//! - `ip_guard_allowed_ranges` - Number of CIDR ranges in the allow-list (label: guard)
//!
//! Recording functions are no-ops until [`init_metrics`] installs a recorder.

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{error, info};

/// Metric names as constants for consistency.
pub mod names {
    pub const GUARD_DECISIONS_TOTAL: &str = "ip_guard_decisions_total";
    pub const GUARD_ALLOWED_RANGES: &str = "ip_guard_allowed_ranges";
}

/// Initialize the Prometheus metrics exporter on `metrics_addr`.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::GUARD_DECISIONS_TOTAL,
        "Total number of access guard decisions by outcome"
    );
    describe_gauge!(
        names::GUARD_ALLOWED_RANGES,
        "Number of CIDR ranges in the access guard allow-list"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record one guard decision.
pub fn record_guard_decision(guard: &str, decision: &'static str) {
    counter!(names::GUARD_DECISIONS_TOTAL, "guard" => guard.to_string(), "decision" => decision)
        .increment(1);
}

/// Publish the allow-list size of a guard.
pub fn set_allowed_ranges(guard: &str, count: usize) {
    gauge!(names::GUARD_ALLOWED_RANGES, "guard" => guard.to_string()).set(count as f64);
}
