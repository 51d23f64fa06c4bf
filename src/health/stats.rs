//! Buffer health snapshot for observability.

use serde::Serialize;

/// Utilization at or above this ratio reports the buffer as unhealthy.
pub const HEALTHY_UTILIZATION_LIMIT: f64 = 0.8;

/// Point-in-time statistics of the metrics registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferHealthStats {
    pub total_log_events: usize,
    pub total_request_metrics: usize,
    pub events_in_window: usize,
    /// Error and above.
    pub errors_in_window: usize,
    pub warnings_in_window: usize,
    pub total_http_errors: usize,
    pub buffer_size_limit: usize,
    pub window_size_seconds: u64,
    /// `total_log_events / buffer_size_limit`, 0.0 to 1.0.
    pub buffer_utilization: f64,
    pub is_healthy: bool,
    pub health_status: &'static str,
}

impl BufferHealthStats {
    pub(crate) fn utilization(total: usize, limit: usize) -> (f64, bool, &'static str) {
        let utilization = total as f64 / limit.max(1) as f64;
        let healthy = utilization < HEALTHY_UTILIZATION_LIMIT;
        (utilization, healthy, if healthy { "Healthy" } else { "Warning" })
    }
}
