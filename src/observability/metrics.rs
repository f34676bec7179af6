//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pooling_requests_total` (counter): requests by method, path, status
//! - `pooling_request_duration_seconds` (histogram): latency distribution
//! - `pooling_journeys_total` (counter): journey requests by outcome
//! - `pooling_promotions_total` (counter): waiting groups moved into cars
//! - `pooling_cars`, `pooling_groups_riding`, `pooling_groups_waiting`,
//!   `pooling_free_seats` (gauges): pool state after each mutation
//!
//! Without an installed recorder every call is a no-op, so handlers record
//! unconditionally.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::pooling::PoolStats;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished HTTP request.
pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("pooling_requests_total", &labels[..]).increment(1);
    histogram!("pooling_request_duration_seconds", &labels[..2])
        .record(start.elapsed().as_secs_f64());
}

/// Record how a journey request ended (`seated`, `queued`, `rejected`).
pub fn record_journey(outcome: &'static str) {
    counter!("pooling_journeys_total", "outcome" => outcome).increment(1);
}

/// Record waiting groups promoted after a dropoff.
pub fn record_promotions(count: usize) {
    if count > 0 {
        counter!("pooling_promotions_total").increment(count as u64);
    }
}

/// Publish the current pool state.
pub fn record_pool(stats: &PoolStats) {
    gauge!("pooling_cars").set(stats.cars as f64);
    gauge!("pooling_free_seats").set(stats.free_seats as f64);
    gauge!("pooling_groups_riding").set(stats.riding as f64);
    gauge!("pooling_groups_waiting").set(stats.waiting as f64);
}
