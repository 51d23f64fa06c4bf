//! Metrics registry subsystem.
//!
//! # Data Flow
//! ```text
//! Log events (observability::layer):
//!     Warning and above
//!     → MetricsRegistry::record_log
//!     → evict by window, append, evict by capacity
//!
//! Requests (http::middleware):
//!     Completed request
//!     → MetricsRegistry::record_request
//!     → append, evict by capacity, evict by window
//!
//! Readers:
//!     detector   → count_recent_logs
//!     admin API  → health_stats
//! ```
//!
//! # Design Decisions
//! - Storage is a lock-free ring per buffer (ring.rs); no global lock on writes
//! - Counts are recomputed from retained observations, not kept as running totals
//! - Registry is shared via Arc and never rebuilt

pub mod registry;
pub mod ring;
pub mod stats;

pub use registry::{unix_now, LogObservation, MetricsRegistry, RequestObservation, WindowCounts};
pub use stats::BufferHealthStats;
