//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! tracing event
//!     → EnvFilter (static directives)
//!     → layer.rs (MetricsLayer → MetricsRegistry)
//!     → filter.rs (SeverityFilter, live gate / force fields) → fmt output
//!
//! Controller activity:
//!     → metrics.rs (counters, gauge) → Prometheus scrape
//! ```
//!
//! # Design Decisions
//! - The gate is read per event; no subscriber rebuild on level changes
//! - Metrics are cheap (atomic increments) and optional

pub mod filter;
pub mod layer;
pub mod logging;
pub mod metrics;

pub use filter::SeverityFilter;
pub use layer::MetricsLayer;
pub use logging::init_logging;
