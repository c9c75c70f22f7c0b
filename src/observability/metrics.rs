//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bookstore_dispatch_total` (counter): dispatches by method, outcome
//! - `bookstore_dispatch_duration_seconds` (histogram): time spent in dispatch
//! - `bookstore_routes` (gauge): size of the route table

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Result of a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    NotFound,
    Failed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Matched => "matched",
            Outcome::NotFound => "not_found",
            Outcome::Failed => "failed",
        }
    }
}

/// Install the Prometheus exporter listening on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Label value for a request method. Extension methods share one bucket so
/// clients cannot mint new series.
pub fn method_label(method: &str) -> &'static str {
    const STANDARD: [&str; 9] = [
        "GET", "HEAD", "POST", "PUT", "DELETE", "CONNECT", "OPTIONS", "TRACE", "PATCH",
    ];
    STANDARD
        .into_iter()
        .find(|m| m.eq_ignore_ascii_case(method))
        .unwrap_or("OTHER")
}

pub fn record_dispatch(method: &str, outcome: Outcome, start: Instant) {
    let method = method_label(method);
    counter!(
        "bookstore_dispatch_total",
        "method" => method,
        "outcome" => outcome.as_str()
    )
    .increment(1);
    histogram!("bookstore_dispatch_duration_seconds", "method" => method)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_route_table(routes: usize) {
    gauge!("bookstore_routes").set(routes as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label_buckets_extensions() {
        assert_eq!(method_label("get"), "GET");
        assert_eq!(method_label("Patch"), "PATCH");
        assert_eq!(method_label("FOO1"), "OTHER");
        assert_eq!(method_label("FOO2"), "OTHER");
        assert_eq!(method_label(""), "OTHER");
    }
}
