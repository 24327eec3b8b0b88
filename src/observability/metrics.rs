//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_requests_total` (counter): dispatched requests by method, outcome
//! - `router_registrations_total` (counter): registrations by outcome

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// How a dispatched request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Matched,
    NotFound,
    Recovered,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Matched => "matched",
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::Recovered => "recovered",
        }
    }
}

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_dispatch(method: &str, outcome: DispatchOutcome) {
    metrics::counter!(
        "router_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

pub fn record_registration(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    metrics::counter!("router_registrations_total", "outcome" => outcome).increment(1);
}
