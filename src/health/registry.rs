//! Time-windowed registry of recent log severities and request outcomes.
//!
//! # Responsibilities
//! - Record log events (Warning and above) and completed requests
//! - Keep both buffers bounded by count and by age
//! - Answer windowed counts for the detector and health stats for the admin API
//!
//! # Design Decisions
//! - Logs evict by window first, then capacity, so recent history survives load
//! - Requests evict by capacity first, then window; they only feed health reporting
//! - Nothing here panics or blocks; it sits on the logging hot path

use std::num::NonZeroUsize;

use chrono::Utc;

use crate::config::{SmartLogConfig, ValidationError};
use crate::health::ring::{ObservationRing, Packed};
use crate::health::stats::BufferHealthStats;
use crate::level::Severity;

/// Current wall-clock time in unix seconds.
pub fn unix_now() -> u64 {
    u64::try_from(Utc::now().timestamp()).unwrap_or(0)
}

/// A retained log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogObservation {
    pub timestamp: u64,
    pub severity: Severity,
}

impl Packed for LogObservation {
    fn pack(self) -> u64 {
        (self.timestamp.min(MAX_LOG_TIMESTAMP) << 8) | ((self.severity as u64) << 1)
    }

    fn unpack(raw: u64) -> Self {
        Self {
            timestamp: raw >> 8,
            severity: Severity::from_u8(((raw >> 1) & 0x7) as u8),
        }
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Largest timestamp that fits in a packed log slot.
const MAX_LOG_TIMESTAMP: u64 = (1 << 56) - 1;

/// Largest timestamp that fits in a packed request slot (year 2106).
const MAX_REQUEST_TIMESTAMP: u64 = u32::MAX as u64;

/// Largest latency that fits in a packed request slot (about 12 days).
const MAX_PACKED_LATENCY_MS: u64 = (1 << 30) - 1;

/// A completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestObservation {
    pub timestamp: u64,
    pub latency_ms: u64,
    pub is_server_error: bool,
}

impl Packed for RequestObservation {
    fn pack(self) -> u64 {
        (self.timestamp.min(MAX_REQUEST_TIMESTAMP) << 32)
            | (self.latency_ms.min(MAX_PACKED_LATENCY_MS) << 2)
            | (u64::from(self.is_server_error) << 1)
    }

    fn unpack(raw: u64) -> Self {
        Self {
            timestamp: raw >> 32,
            latency_ms: (raw >> 2) & MAX_PACKED_LATENCY_MS,
            is_server_error: (raw >> 1) & 1 == 1,
        }
    }

    fn timestamp(&self) -> u64 {
        self.timestamp
    }
}

/// Log counts inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowCounts {
    /// Error and above.
    pub errors: usize,
    pub warnings: usize,
    pub total: usize,
}

/// Central, thread-safe store of recent observations.
#[derive(Debug)]
pub struct MetricsRegistry {
    logs: ObservationRing<LogObservation>,
    requests: ObservationRing<RequestObservation>,
    window_seconds: u64,
}

impl MetricsRegistry {
    pub fn new(capacity: NonZeroUsize, window_seconds: u64) -> Self {
        Self {
            logs: ObservationRing::new(capacity),
            requests: ObservationRing::new(capacity),
            window_seconds,
        }
    }

    /// Build from configuration, rejecting a zero capacity or window up front.
    pub fn from_config(config: &SmartLogConfig) -> Result<Self, ValidationError> {
        let capacity =
            NonZeroUsize::new(config.buffer_capacity).ok_or(ValidationError::ZeroCapacity)?;
        if config.window_seconds == 0 {
            return Err(ValidationError::ZeroWindow);
        }
        Ok(Self::new(capacity, config.window_seconds))
    }

    pub fn capacity(&self) -> usize {
        self.logs.capacity()
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    fn cutoff(&self, now: u64) -> u64 {
        now.saturating_sub(self.window_seconds)
    }

    /// Record a log event. Events below Warning are ignored.
    pub fn record_log(&self, severity: Severity) {
        self.record_log_at(severity, unix_now());
    }

    pub fn record_log_at(&self, severity: Severity, timestamp: u64) {
        if severity < Severity::Warning {
            return;
        }

        self.logs.evict_older_than(self.cutoff(timestamp));
        self.logs.push(LogObservation {
            timestamp,
            severity,
        });
        self.logs.evict_over_capacity();
    }

    /// Record a completed request.
    pub fn record_request(&self, latency_ms: u64, is_server_error: bool) {
        self.record_request_at(latency_ms, is_server_error, unix_now());
    }

    pub fn record_request_at(&self, latency_ms: u64, is_server_error: bool, timestamp: u64) {
        self.requests.push(RequestObservation {
            timestamp,
            latency_ms,
            is_server_error,
        });
        self.requests.evict_over_capacity();
        self.requests.evict_older_than(self.cutoff(timestamp));
    }

    pub fn count_logs(&self, predicate: impl FnMut(&LogObservation) -> bool) -> usize {
        self.logs.count(predicate)
    }

    pub fn count_requests(&self, predicate: impl FnMut(&RequestObservation) -> bool) -> usize {
        self.requests.count(predicate)
    }

    pub fn log_events_count(&self) -> usize {
        self.logs.len()
    }

    pub fn request_metrics_count(&self) -> usize {
        self.requests.len()
    }

    /// Retained log events, oldest first.
    pub fn snapshot_logs(&self) -> Vec<LogObservation> {
        self.logs.snapshot()
    }

    /// Count log events whose timestamp is within `window_seconds` of `now`.
    pub fn count_recent_logs(&self, now: u64) -> WindowCounts {
        let cutoff = self.cutoff(now);
        let mut counts = WindowCounts::default();

        self.logs.for_each(|obs| {
            if obs.timestamp < cutoff {
                return;
            }
            counts.total += 1;
            if obs.severity >= Severity::Error {
                counts.errors += 1;
            } else if obs.severity == Severity::Warning {
                counts.warnings += 1;
            }
        });

        counts
    }

    pub fn health_stats(&self) -> BufferHealthStats {
        self.health_stats_at(unix_now())
    }

    pub fn health_stats_at(&self, now: u64) -> BufferHealthStats {
        let recent = self.count_recent_logs(now);
        let total_log_events = self.logs.len();
        let (buffer_utilization, is_healthy, health_status) =
            BufferHealthStats::utilization(total_log_events, self.capacity());

        BufferHealthStats {
            total_log_events,
            total_request_metrics: self.requests.len(),
            events_in_window: recent.total,
            errors_in_window: recent.errors,
            warnings_in_window: recent.warnings,
            total_http_errors: self.count_requests(|r| r.is_server_error),
            buffer_size_limit: self.capacity(),
            window_size_seconds: self.window_seconds,
            buffer_utilization,
            is_healthy,
            health_status,
        }
    }
}
