//! Prometheus metrics for market activity and request latency.
//!
//! This module provides metrics for:
//! - Markets created and resolved
//! - Bets placed and rejected
//! - Alerts registered
//! - Bet placement and HTTP request latency

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Bet placement latency metric name.
pub const METRIC_PLACE_BET_LATENCY: &str = "place_bet_latency_ms";
/// HTTP request latency metric name.
pub const METRIC_HTTP_REQUEST_LATENCY: &str = "http_request_latency_ms";
/// Markets created counter metric name.
pub const METRIC_MARKETS_CREATED: &str = "markets_created_total";
/// Markets resolved counter metric name.
pub const METRIC_MARKETS_RESOLVED: &str = "markets_resolved_total";
/// Bets placed counter metric name.
pub const METRIC_BETS_PLACED: &str = "bets_placed_total";
/// Rejected requests counter metric name.
pub const METRIC_REQUESTS_REJECTED: &str = "requests_rejected_total";
/// Alerts created counter metric name.
pub const METRIC_ALERTS_CREATED: &str = "alerts_created_total";

/// Install the Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    // Latency histograms
    describe_histogram!(
        METRIC_PLACE_BET_LATENCY,
        "Bet placement latency in milliseconds"
    );
    describe_histogram!(
        METRIC_HTTP_REQUEST_LATENCY,
        "HTTP request latency in milliseconds"
    );

    // Counters
    describe_counter!(METRIC_MARKETS_CREATED, "Total number of predictions created");
    describe_counter!(METRIC_MARKETS_RESOLVED, "Total number of predictions resolved");
    describe_counter!(METRIC_BETS_PLACED, "Total number of bets placed");
    describe_counter!(
        METRIC_REQUESTS_REJECTED,
        "Total number of requests rejected, by reason"
    );
    describe_counter!(METRIC_ALERTS_CREATED, "Total number of alerts registered");

    debug!("Metrics initialized");
}

/// Record HTTP request latency.
pub fn record_http_latency(start: Instant, endpoint: &str) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_HTTP_REQUEST_LATENCY, "endpoint" => endpoint.to_string()).record(latency_ms);
}

/// Increment markets created counter.
pub fn inc_markets_created() {
    counter!(METRIC_MARKETS_CREATED).increment(1);
}

/// Increment markets resolved counter.
pub fn inc_markets_resolved() {
    counter!(METRIC_MARKETS_RESOLVED).increment(1);
}

/// Increment bets placed counter.
pub fn inc_bets_placed() {
    counter!(METRIC_BETS_PLACED).increment(1);
}

/// Increment rejected requests counter.
pub fn inc_requests_rejected(reason: &'static str) {
    counter!(METRIC_REQUESTS_REJECTED, "reason" => reason).increment(1);
}

/// Increment alerts created counter.
pub fn inc_alerts_created() {
    counter!(METRIC_ALERTS_CREATED).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        let latency_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        histogram!(self.metric_name).record(latency_ms);
    }
}

/// Create a latency timer for bet placement.
pub fn timer_place_bet() -> LatencyTimer {
    LatencyTimer::new(METRIC_PLACE_BET_LATENCY)
}
