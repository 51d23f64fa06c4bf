//! Periodic reconciliation with the shared state.
//!
//! An instance that missed a broadcast (restart, dropped subscription, lag)
//! catches up here: the stored state is re-read and applied when it differs
//! from the local gate and has not expired. No precedence check is made.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::coordination::client::{CoordinationClient, StoredState};
use crate::coordination::error::StoreError;
use crate::level::{Severity, SeverityGate};
use crate::observability::metrics;

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Absent,
    Invalid,
    Expired,
    InSync,
    Applied { previous: Severity, current: Severity },
}

impl SyncOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Absent => "absent",
            SyncOutcome::Invalid => "invalid",
            SyncOutcome::Expired => "expired",
            SyncOutcome::InSync => "in_sync",
            SyncOutcome::Applied { .. } => "applied",
        }
    }
}

#[derive(Debug)]
pub struct Reconciler {
    client: Arc<CoordinationClient>,
    gate: Arc<SeverityGate>,
    interval: Duration,
}

impl Reconciler {
    pub fn new(client: Arc<CoordinationClient>, gate: Arc<SeverityGate>, interval: Duration) -> Self {
        Self {
            client,
            gate,
            interval,
        }
    }

    pub async fn sync_once(&self) -> Result<SyncOutcome, StoreError> {
        let outcome = match self.client.read_state().await? {
            StoredState::Absent => SyncOutcome::Absent,
            StoredState::Invalid { raw, error } => {
                tracing::warn!(value = %raw, error = %error, "Stored level state is unreadable");
                SyncOutcome::Invalid
            }
            StoredState::Valid(message) if Utc::now() > message.expires_at => SyncOutcome::Expired,
            StoredState::Valid(message) => {
                let current = self.gate.current();
                if current == message.severity {
                    SyncOutcome::InSync
                } else {
                    let previous = self.gate.set(message.severity);
                    tracing::info!(
                        previous = %previous,
                        level = %message.severity,
                        origin = %message.origin,
                        "Reconciled log level with shared state"
                    );
                    metrics::set_current_level(message.severity);
                    SyncOutcome::Applied {
                        previous,
                        current: message.severity,
                    }
                }
            }
        };

        metrics::record_reconcile(outcome.label());
        Ok(outcome)
    }

    /// Sync immediately, then every interval until shutdown.
    pub async fn run(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_secs = self.interval.as_secs(), "Reconciler started");

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("Reconciler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sync_once().await {
                        tracing::error!(error = %e, "Level reconciliation failed");
                        metrics::record_reconcile("failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::keys::StoreKeys;
    use crate::coordination::memory::InMemoryStore;
    use crate::coordination::SharedStore;
    use crate::level::{ChangeOrigin, SwitchMessage};
    use chrono::TimeDelta;

    fn setup(gate_level: Severity) -> (Arc<CoordinationClient>, Arc<SeverityGate>, Reconciler) {
        let client = Arc::new(CoordinationClient::new(
            Arc::new(InMemoryStore::new()),
            StoreKeys::for_app("svc-dev"),
            Duration::from_secs(1),
            Duration::from_secs(3600),
        ));
        let gate = Arc::new(SeverityGate::new(gate_level));
        let reconciler = Reconciler::new(client.clone(), gate.clone(), Duration::from_secs(60));
        (client, gate, reconciler)
    }

    #[tokio::test]
    async fn test_absent_state_is_noop() {
        let (_, gate, reconciler) = setup(Severity::Warning);
        assert_eq!(reconciler.sync_once().await.unwrap(), SyncOutcome::Absent);
        assert_eq!(gate.current(), Severity::Warning);
    }

    #[tokio::test]
    async fn test_applies_unexpired_state_without_precedence() {
        let (client, gate, reconciler) = setup(Severity::Warning);
        let msg = SwitchMessage::new(Severity::Debug, ChangeOrigin::Automatic, 10);
        client.write_state(&msg).await.unwrap();

        assert_eq!(
            reconciler.sync_once().await.unwrap(),
            SyncOutcome::Applied {
                previous: Severity::Warning,
                current: Severity::Debug
            }
        );
        assert_eq!(gate.current(), Severity::Debug);
        assert_eq!(reconciler.sync_once().await.unwrap(), SyncOutcome::InSync);
    }

    #[tokio::test]
    async fn test_ignores_expired_state() {
        let (client, gate, reconciler) = setup(Severity::Warning);
        let msg = SwitchMessage {
            severity: Severity::Verbose,
            origin: ChangeOrigin::Manual,
            expires_at: Utc::now() - TimeDelta::minutes(1),
        };
        client.write_state(&msg).await.unwrap();

        assert_eq!(reconciler.sync_once().await.unwrap(), SyncOutcome::Expired);
        assert_eq!(gate.current(), Severity::Warning);
    }

    #[tokio::test]
    async fn test_invalid_state_is_reported() {
        let store = Arc::new(InMemoryStore::new());
        let keys = StoreKeys::for_app("svc-dev");
        store.set(&keys.state, "garbage", Duration::from_secs(60)).await.unwrap();

        let client = Arc::new(CoordinationClient::new(store, keys, Duration::from_secs(1), Duration::from_secs(60)));
        let gate = Arc::new(SeverityGate::new(Severity::Error));
        let reconciler = Reconciler::new(client, gate.clone(), Duration::from_secs(60));

        assert_eq!(reconciler.sync_once().await.unwrap(), SyncOutcome::Invalid);
        assert_eq!(gate.current(), Severity::Error);
    }
}
