//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define controller metrics (switches, detection cycles, reconcile passes)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `smartlog_level_switches_total` (counter): applied switches by origin, level
//! - `smartlog_level_switches_rejected_total` (counter): precedence rejections
//! - `smartlog_detection_cycles_total` (counter): cycles by outcome
//! - `smartlog_reconcile_total` (counter): reconcile passes by outcome
//! - `smartlog_current_level` (gauge): live gate as its ordinal, 0=Verbose..5=Fatal
//!
//! # Design Decisions
//! - Low-overhead metric updates through the `metrics` facade; no-ops until an exporter is installed
//! - Labels are static strings only

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::level::{ChangeOrigin, Severity};

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_switch_applied(origin: ChangeOrigin, severity: Severity) {
    metrics::counter!(
        "smartlog_level_switches_total",
        "origin" => origin.as_str(),
        "level" => severity.as_str()
    )
    .increment(1);
    set_current_level(severity);
}

pub fn record_switch_rejected() {
    metrics::counter!("smartlog_level_switches_rejected_total").increment(1);
}

pub fn record_detection_cycle(outcome: &'static str) {
    metrics::counter!("smartlog_detection_cycles_total", "outcome" => outcome).increment(1);
}

pub fn record_reconcile(outcome: &'static str) {
    metrics::counter!("smartlog_reconcile_total", "outcome" => outcome).increment(1);
}

pub fn set_current_level(severity: Severity) {
    metrics::gauge!("smartlog_current_level").set(f64::from(severity as u8));
}
