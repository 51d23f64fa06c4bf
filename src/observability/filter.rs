//! Live severity gate for log output.
//!
//! # Responsibilities
//! - Suppress events below the current gate
//! - In force mode, admit events carrying a configured boolean field set to `true`
//!
//! # Design Decisions
//! - Callsite interest is always "sometimes" so a gate change applies to the
//!   very next event without rebuilding the interest cache
//! - No max level hint; the gate moves at runtime

use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::subscriber::Interest;
use tracing::{Event, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Filter};

use crate::config::FilterMode;
use crate::level::{Severity, SeverityGate};

#[derive(Debug, Clone)]
pub struct SeverityFilter {
    gate: Arc<SeverityGate>,
    mode: FilterMode,
}

impl SeverityFilter {
    pub fn new(gate: Arc<SeverityGate>, mode: FilterMode) -> Self {
        Self { gate, mode }
    }

    fn admits(&self, metadata: &Metadata<'_>) -> bool {
        self.gate.admits(Severity::from(*metadata.level()))
    }
}

struct ForceVisitor<'a> {
    properties: &'a [String],
    forced: bool,
}

impl Visit for ForceVisitor<'_> {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if value && self.properties.iter().any(|p| p == field.name()) {
            self.forced = true;
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S> Filter<S> for SeverityFilter {
    fn enabled(&self, metadata: &Metadata<'_>, _cx: &Context<'_, S>) -> bool {
        // Forced events are decided once their fields are visible.
        match self.mode {
            FilterMode::Force { .. } if metadata.is_event() => true,
            _ => self.admits(metadata),
        }
    }

    fn event_enabled(&self, event: &Event<'_>, _cx: &Context<'_, S>) -> bool {
        if self.admits(event.metadata()) {
            return true;
        }

        match &self.mode {
            FilterMode::Gate => false,
            FilterMode::Force { properties } => {
                let mut visitor = ForceVisitor {
                    properties,
                    forced: false,
                };
                event.record(&mut visitor);
                visitor.forced
            }
        }
    }

    fn callsite_enabled(&self, _metadata: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Layer, SubscriberExt};

    #[derive(Clone, Default)]
    struct Counter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for Counter {
        fn on_event(&self, _event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn count_with(mode: FilterMode, gate: Arc<SeverityGate>, emit: impl Fn()) -> usize {
        let counter = Counter::default();
        let seen = counter.0.clone();
        let subscriber = tracing_subscriber::registry()
            .with(counter.with_filter(SeverityFilter::new(gate, mode)));
        tracing::subscriber::with_default(subscriber, emit);
        seen.load(Ordering::SeqCst)
    }

    #[test]
    fn test_gate_mode_follows_live_level() {
        let gate = Arc::new(SeverityGate::new(Severity::Warning));
        let emit = || {
            tracing::info!("info");
            tracing::warn!("warn");
            tracing::error!("error");
        };

        assert_eq!(count_with(FilterMode::Gate, gate.clone(), emit), 2);
        gate.set(Severity::Information);
        assert_eq!(count_with(FilterMode::Gate, gate.clone(), emit), 3);
        gate.set(Severity::Fatal);
        assert_eq!(count_with(FilterMode::Gate, gate, emit), 0);
    }

    #[test]
    fn test_gate_change_applies_to_cached_callsite() {
        let gate = Arc::new(SeverityGate::new(Severity::Error));
        let counter = Counter::default();
        let seen = counter.0.clone();
        let subscriber = tracing_subscriber::registry()
            .with(counter.with_filter(SeverityFilter::new(gate.clone(), FilterMode::Gate)));

        tracing::subscriber::with_default(subscriber, || {
            for level in [Severity::Error, Severity::Debug] {
                gate.set(level);
                tracing::debug!("same callsite");
            }
        });
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_force_mode_admits_flagged_events() {
        let gate = Arc::new(SeverityGate::new(Severity::Error));
        let mode = FilterMode::Force {
            properties: vec!["force".to_string()],
        };

        let forced = count_with(mode.clone(), gate.clone(), || {
            tracing::debug!(force = true, "forced through");
        });
        assert_eq!(forced, 1);

        let unflagged = count_with(mode.clone(), gate.clone(), || {
            tracing::debug!("suppressed");
            tracing::debug!(force = false, "suppressed");
            tracing::debug!(other = true, "suppressed");
        });
        assert_eq!(unflagged, 0);

        let gated_only = count_with(FilterMode::Gate, gate, || {
            tracing::debug!(force = true, "suppressed in gate mode");
        });
        assert_eq!(gated_only, 0);
    }
}
