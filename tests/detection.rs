//! Detection cycle tests: single-flight, hysteresis and failure handling.

use std::sync::Arc;
use std::time::Duration;

use smartlog::coordination::{InMemoryStore, Reconciler};
use smartlog::detection::CycleOutcome;
use smartlog::observability::MetricsLayer;
use smartlog::{Severity, Shutdown, SmartLog, SmartLogConfig};
use tokio::sync::Barrier;
use tracing_subscriber::layer::SubscriberExt;

mod common;

fn record_errors(smartlog: &SmartLog, count: usize) {
    for _ in 0..count {
        smartlog.registry().record_log(Severity::Error);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_triggers_apply_at_most_once() {
    let inner = Arc::new(InMemoryStore::new());
    let store = Arc::new(common::SlowStore::new(inner, Duration::from_millis(200)));
    let smartlog = SmartLog::new(common::test_config(), store).unwrap();
    record_errors(&smartlog, 5);

    let barrier = Arc::new(Barrier::new(5));
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let detector = smartlog.detector().clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                detector.run_detection_cycle().await
            })
        })
        .collect();

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let applied = outcomes
        .iter()
        .filter(|o| matches!(o, CycleOutcome::Applied(_)))
        .count();
    let skipped = outcomes.iter().filter(|o| **o == CycleOutcome::Skipped).count();
    assert_eq!(applied, 1, "{outcomes:?}");
    assert_eq!(skipped, 4, "{outcomes:?}");
    assert!(!smartlog.detector().is_running());
}

#[tokio::test]
async fn test_escalation_then_held_deescalation() {
    let config = SmartLogConfig {
        coordination_enabled: false,
        window_seconds: 1,
        ..common::test_config()
    };
    let smartlog = SmartLog::in_memory(config).unwrap();
    record_errors(&smartlog, 5);

    assert_eq!(
        smartlog.detector().run_detection_cycle().await,
        CycleOutcome::Applied(Severity::Information)
    );
    assert_eq!(smartlog.gate().current(), Severity::Information);

    // Let the errors leave the one-second window.
    tokio::time::sleep(Duration::from_millis(2100)).await;

    assert_eq!(smartlog.detector().run_detection_cycle().await, CycleOutcome::Deferred);
    assert_eq!(smartlog.gate().current(), Severity::Information);
    assert!(!smartlog.detector().last_decision().should_raise_verbosity);
}

#[tokio::test]
async fn test_deescalation_without_prior_switch_applies() {
    let config = SmartLogConfig {
        coordination_enabled: false,
        ..common::test_config()
    };
    let smartlog = SmartLog::in_memory(config).unwrap();

    // Raised by hand, then the manual hold is cleared: nothing holds the return.
    smartlog.gate().set(Severity::Debug);

    assert_eq!(
        smartlog.detector().run_detection_cycle().await,
        CycleOutcome::Applied(Severity::Warning)
    );
    assert_eq!(smartlog.gate().current(), Severity::Warning);
}

#[tokio::test]
async fn test_active_manual_override_suppresses_local_switch() {
    let config = SmartLogConfig {
        coordination_enabled: false,
        ..common::test_config()
    };
    let smartlog = SmartLog::in_memory(config).unwrap();
    smartlog.switcher().manual_override(Severity::Debug, 30).await.unwrap();

    // Quiet registry recommends economy, but the override still holds.
    assert_eq!(
        smartlog.detector().run_detection_cycle().await,
        CycleOutcome::Suppressed
    );
    assert_eq!(smartlog.gate().current(), Severity::Debug);
}

#[tokio::test]
async fn test_store_failure_fails_cycle_and_releases_guard() {
    let smartlog = SmartLog::new(common::test_config(), Arc::new(common::FailingStore)).unwrap();
    record_errors(&smartlog, 5);

    assert_eq!(smartlog.detector().run_detection_cycle().await, CycleOutcome::Failed);
    assert!(!smartlog.detector().is_running());
    assert_eq!(smartlog.gate().current(), Severity::Warning);

    // The decision is still recorded for observability.
    assert!(smartlog.detector().last_decision().should_raise_verbosity);
    assert_eq!(smartlog.detector().run_detection_cycle().await, CycleOutcome::Failed);
}

#[tokio::test]
async fn test_store_outage_does_not_feed_escalation() {
    let smartlog = SmartLog::new(common::test_config(), Arc::new(common::FailingStore)).unwrap();
    let subscriber =
        tracing_subscriber::registry().with(MetricsLayer::new(smartlog.registry().clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    // Every pass fails against the store and logs an error.
    let reconciler = Arc::new(Reconciler::new(
        smartlog.client().clone(),
        smartlog.gate().clone(),
        Duration::from_millis(1),
    ));
    let shutdown = Shutdown::new();
    let task = tokio::spawn(reconciler.run(shutdown.subscribe()));
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();
    task.await.unwrap();

    assert_eq!(smartlog.registry().log_events_count(), 0);
    assert_eq!(
        smartlog.detector().run_detection_cycle().await,
        CycleOutcome::Unchanged
    );
    assert!(!smartlog.detector().last_decision().should_raise_verbosity);
    assert_eq!(smartlog.gate().current(), Severity::Warning);
}
