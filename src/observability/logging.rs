//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Feed every event into the metrics registry
//! - Gate formatted output by the live severity
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `EnvFilter` (RUST_LOG, else config directives) runs first and defaults to
//!   `trace`, so the severity gate is the effective control
//! - The registry layer sits outside the gate so detection sees errors even
//!   while output is quiet

use std::sync::Arc;

use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::{FilterMode, ObservabilityConfig};
use crate::health::MetricsRegistry;
use crate::level::SeverityGate;
use crate::observability::filter::SeverityFilter;
use crate::observability::layer::MetricsLayer;

/// Install the process-wide subscriber. Fails if one is already set.
pub fn init_logging(
    config: &ObservabilityConfig,
    mode: FilterMode,
    gate: Arc<SeverityGate>,
    registry: Arc<MetricsRegistry>,
) -> Result<(), TryInitError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.directives));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(MetricsLayer::new(registry))
        .with(tracing_subscriber::fmt::layer().with_filter(SeverityFilter::new(gate, mode)))
        .try_init()
}
