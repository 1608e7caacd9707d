//! Dispatch metrics.
//!
//! # Metrics
//! - `router_dispatch_total` (counter): dispatches by outcome and route
//! - `router_dispatch_duration_seconds` (histogram): time spent in `run`
//!
//! Recorded through the `metrics` facade; the embedding application installs
//! the recorder/exporter.

use std::time::Instant;

/// Record one finished dispatch.
pub fn record_dispatch(outcome: &str, route: &str, started: Instant) {
    let labels = [
        ("outcome", outcome.to_string()),
        ("route", route.to_string()),
    ];
    metrics::counter!("router_dispatch_total", &labels).increment(1);
    metrics::histogram!("router_dispatch_duration_seconds", &labels)
        .record(started.elapsed().as_secs_f64());
}
