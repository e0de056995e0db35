//! Metrics collection and exposition.
//!
//! # Metrics
//! - `monitor_checks_total` (counter): checks by service, availability
//! - `monitor_probe_latency_ms` (histogram): probe latency by service
//! - `monitor_consecutive_failures` (gauge): current streak by service
//! - `monitor_alerts_total` (counter): alert events by service, kind
//! - `monitor_probe_faults_total` (counter): probe faults by service
//!
//! Without an installed recorder every call here is a no-op.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::health::{AlertEvent, HealthResult};

/// Install the global Prometheus recorder and return a handle for `/metrics`.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            tracing::info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

pub fn record_check(result: &HealthResult, consecutive_failures: u32) {
    let service = result.service_name().to_string();

    counter!(
        "monitor_checks_total",
        "service" => service.clone(),
        "available" => result.is_available().to_string()
    )
    .increment(1);
    histogram!("monitor_probe_latency_ms", "service" => service.clone()).record(result.latency_ms());
    gauge!("monitor_consecutive_failures", "service" => service).set(consecutive_failures as f64);
}

pub fn record_alert(event: &AlertEvent) {
    counter!(
        "monitor_alerts_total",
        "service" => event.service().to_string(),
        "kind" => event.kind()
    )
    .increment(1);
}

pub fn record_fault(service: &str) {
    counter!("monitor_probe_faults_total", "service" => service.to_string()).increment(1);
}
