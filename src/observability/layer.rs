//! Feeds log events into the metrics registry.

use std::sync::Arc;

use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::health::MetricsRegistry;
use crate::level::Severity;

/// Event targets that belong to the controller itself. Their warnings and
/// errors describe the controller, not the application, and never count
/// toward escalation.
const INTERNAL_TARGETS: &[&str] = &["smartlog", "tower_http"];

fn is_internal(target: &str) -> bool {
    INTERNAL_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Records every application event's severity, independent of the live gate.
///
/// The registry drops anything below Warning, so this never allocates on the
/// common path.
#[derive(Debug, Clone)]
pub struct MetricsLayer {
    registry: Arc<MetricsRegistry>,
}

impl MetricsLayer {
    pub fn new(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }
}

impl<S: Subscriber> Layer<S> for MetricsLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_internal(metadata.target()) {
            return;
        }
        self.registry.record_log(Severity::from(*metadata.level()));
    }
}
