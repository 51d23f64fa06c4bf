//! Economy detector.
//!
//! # Responsibilities
//! - Run detection cycles on a timer
//! - Count recent errors, apply the threshold rule, keep the last decision
//! - Hand level changes to the hysteresis gate and then the switcher
//!
//! # Design Decisions
//! - Single-flight per instance: an overlapping trigger is skipped, not queued
//! - Each tick spawns its cycle so a slow store call never delays the timer
//! - Failures end the cycle; the next tick is the retry

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{TimeDelta, Utc};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::config::SmartLogConfig;
use crate::coordination::{CoordinationClient, CoordinationError, LevelSwitcher};
use crate::detection::decision::{decide, Decision, Thresholds};
use crate::detection::hysteresis::{HysteresisGate, Verdict};
use crate::health::{unix_now, MetricsRegistry};
use crate::level::{ChangeOrigin, Severity, SeverityGate};
use crate::observability::metrics;

/// Result of one detection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was running.
    Skipped,
    /// Recommendation already matches the gate.
    Unchanged,
    Applied(Severity),
    /// De-escalation held by the minimum duration.
    Deferred,
    /// The local consumer kept an active manual override.
    Suppressed,
    Failed,
}

impl CycleOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Skipped => "skipped",
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Applied(_) => "applied",
            CycleOutcome::Deferred => "deferred",
            CycleOutcome::Suppressed => "suppressed",
            CycleOutcome::Failed => "failed",
        }
    }
}

/// Clears the in-flight flag on every exit path.
struct CycleGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

pub struct EconomyDetector {
    registry: Arc<MetricsRegistry>,
    gate: Arc<SeverityGate>,
    switcher: Arc<LevelSwitcher>,
    hysteresis: HysteresisGate,
    thresholds: Thresholds,
    minimum_minutes: u32,
    interval: Duration,
    running: AtomicBool,
    last_decision: ArcSwap<Decision>,
}

impl EconomyDetector {
    pub fn new(
        config: &SmartLogConfig,
        registry: Arc<MetricsRegistry>,
        gate: Arc<SeverityGate>,
        client: Arc<CoordinationClient>,
        switcher: Arc<LevelSwitcher>,
    ) -> Self {
        let minimum_minutes = config.minimum_high_verbosity_minutes;
        let minimum = TimeDelta::try_minutes(i64::from(minimum_minutes)).unwrap_or(TimeDelta::MAX);

        Self {
            registry,
            gate,
            switcher,
            hysteresis: HysteresisGate::new(client, minimum),
            thresholds: Thresholds {
                error_threshold: config.error_threshold,
                window_seconds: config.window_seconds,
                economy: config.economy_level,
                high_verbosity: config.high_verbosity_level,
            },
            minimum_minutes,
            interval: config.detection_interval(),
            running: AtomicBool::new(false),
            last_decision: ArcSwap::from_pointee(Decision::initialized(config.economy_level)),
        }
    }

    pub fn last_decision(&self) -> Arc<Decision> {
        self.last_decision.load_full()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Option<CycleGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard {
                running: &self.running,
            })
    }

    /// Run one cycle unless another is already in flight.
    pub async fn run_detection_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.try_begin() else {
            tracing::debug!("Detection cycle already running, skipping");
            metrics::record_detection_cycle(CycleOutcome::Skipped.label());
            return CycleOutcome::Skipped;
        };

        let outcome = match self.evaluate().await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Detection cycle failed");
                CycleOutcome::Failed
            }
        };

        metrics::record_detection_cycle(outcome.label());
        outcome
    }

    async fn evaluate(&self) -> Result<CycleOutcome, CoordinationError> {
        let counts = self.registry.count_recent_logs(unix_now());
        let decision = decide(counts.errors, &self.thresholds);
        let recommended = decision.recommended;

        tracing::debug!(
            errors = counts.errors,
            warnings = counts.warnings,
            recommended = %recommended,
            reason = %decision.reason,
            "Detection cycle evaluated"
        );
        self.last_decision.store(Arc::new(decision));

        let current = self.gate.current();
        if recommended == current {
            return Ok(CycleOutcome::Unchanged);
        }

        match self.hysteresis.evaluate(current, recommended, Utc::now()).await? {
            Verdict::Defer { until } => {
                tracing::info!(
                    current = %current,
                    recommended = %recommended,
                    hold_until = %until,
                    "Minimum high verbosity time not reached, deferring"
                );
                Ok(CycleOutcome::Deferred)
            }
            Verdict::Apply => {
                let dispatch = self
                    .switcher
                    .switch_level(recommended, ChangeOrigin::Automatic, self.minimum_minutes)
                    .await?;
                if dispatch.is_refused() {
                    return Ok(CycleOutcome::Suppressed);
                }
                Ok(CycleOutcome::Applied(recommended))
            }
        }
    }

    /// Trigger a cycle immediately, then every interval until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            threshold = self.thresholds.error_threshold,
            "Economy detector started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Economy detector stopped");
                    return;
                }
                _ = ticker.tick() => {
                    let detector = Arc::clone(&self);
                    tokio::spawn(async move {
                        detector.run_detection_cycle().await;
                    });
                }
            }
        }
    }
}

impl fmt::Debug for EconomyDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EconomyDetector")
            .field("thresholds", &self.thresholds)
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{ChannelConsumer, InMemoryStore};

    fn detector(config: &SmartLogConfig) -> (Arc<MetricsRegistry>, Arc<SeverityGate>, EconomyDetector) {
        let registry = Arc::new(MetricsRegistry::from_config(config).unwrap());
        let gate = Arc::new(SeverityGate::new(config.economy_level));
        let client = Arc::new(CoordinationClient::from_config(Arc::new(InMemoryStore::new()), config));
        let consumer = Arc::new(ChannelConsumer::new(client.clone(), gate.clone()));
        let switcher = Arc::new(LevelSwitcher::local(consumer));
        let detector = EconomyDetector::new(config, registry.clone(), gate.clone(), client, switcher);
        (registry, gate, detector)
    }

    fn config() -> SmartLogConfig {
        SmartLogConfig {
            error_threshold: 5,
            coordination_enabled: false,
            ..SmartLogConfig::default()
        }
    }

    #[tokio::test]
    async fn test_initial_decision() {
        let (_, _, detector) = detector(&config());
        let decision = detector.last_decision();
        assert_eq!(decision.recommended, Severity::Warning);
        assert_eq!(decision.reason, "Detector initialized.");
        assert_eq!(decision.score, 0);
    }

    #[tokio::test]
    async fn test_quiet_registry_leaves_gate_unchanged() {
        let (registry, gate, detector) = detector(&config());
        for _ in 0..4 {
            registry.record_log(Severity::Error);
        }

        assert_eq!(detector.run_detection_cycle().await, CycleOutcome::Unchanged);
        assert_eq!(gate.current(), Severity::Warning);
        assert_eq!(detector.last_decision().score, 4);
    }

    #[tokio::test]
    async fn test_threshold_escalates_in_same_cycle() {
        let (registry, gate, detector) = detector(&config());
        for _ in 0..5 {
            registry.record_log(Severity::Error);
        }

        assert_eq!(
            detector.run_detection_cycle().await,
            CycleOutcome::Applied(Severity::Information)
        );
        assert_eq!(gate.current(), Severity::Information);
        assert!(detector.last_decision().should_raise_verbosity);
        assert!(!detector.is_running());
    }

    #[tokio::test]
    async fn test_deescalation_waits_for_minimum_duration() {
        let (registry, gate, detector) = detector(&config());
        for _ in 0..5 {
            registry.record_log(Severity::Error);
        }
        detector.run_detection_cycle().await;
        assert_eq!(gate.current(), Severity::Information);

        // Errors age out of the window; the recommendation flips back to economy.
        let quiet = MetricsRegistry::from_config(&config()).unwrap();
        let detector = EconomyDetector {
            registry: Arc::new(quiet),
            ..detector
        };
        assert_eq!(detector.run_detection_cycle().await, CycleOutcome::Deferred);
        assert_eq!(gate.current(), Severity::Information);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_skipped() {
        let (_, _, detector) = detector(&config());
        let guard = detector.try_begin();
        assert!(guard.is_some());
        assert_eq!(detector.run_detection_cycle().await, CycleOutcome::Skipped);

        drop(guard);
        assert_eq!(detector.run_detection_cycle().await, CycleOutcome::Unchanged);
    }
}
