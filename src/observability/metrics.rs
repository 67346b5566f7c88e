//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_logger_requests_total` (counter): requests by route, status
//! - `api_logger_request_duration_seconds` (histogram): latency distribution
//! - `api_logger_rate_limited_total` (counter): rejected admissions
//! - `api_logger_log_appends_total` (counter): appends by outcome
//! - `api_logger_notifications_total` (counter): deliveries by target, outcome
//! - `api_logger_notifications_dropped_total` (counter): queue overflow
//! - `api_logger_tracked_visitors` (gauge): keys held by the rate limiter
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &'static str, status: u16, start: Instant) {
    counter!(
        "api_logger_requests_total",
        "route" => route,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("api_logger_request_duration_seconds", "route" => route)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    counter!("api_logger_rate_limited_total").increment(1);
}

pub fn record_log_append(ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("api_logger_log_appends_total", "outcome" => outcome).increment(1);
}

pub fn record_notification(target: &'static str, outcome: &'static str) {
    counter!(
        "api_logger_notifications_total",
        "target" => target,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_notification_dropped() {
    counter!("api_logger_notifications_dropped_total").increment(1);
}

pub fn record_tracked_visitors(count: usize) {
    gauge!("api_logger_tracked_visitors").set(count as f64);
}
