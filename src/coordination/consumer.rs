//! Level change consumer.
//!
//! # Responsibilities
//! - Subscribe to the application channel and stay subscribed until shutdown
//! - Decide whether an incoming switch outranks the stored one
//! - Apply accepted switches to the gate and persist them
//!
//! # Data Flow
//! ```text
//! channel payload
//!     → SwitchMessage::decode (invalid: warn, drop)
//!     → read state key (unreadable: warn, ignore)
//!     → can_apply (precedence table)
//!     → gate.set → write state → write/clear last switch
//! ```
//!
//! # Design Decisions
//! - Manual beats Automatic until it expires; Automatic replaces Automatic
//! - Check-then-act against the store is best-effort; the reconciler converges
//! - A stored value that cannot be decoded blocks every switch and is left
//!   in place; the state TTL or an operator clears it

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::coordination::client::{CoordinationClient, StoredState};
use crate::coordination::error::{CoordinationError, CoordinationResult};
use crate::level::{ChangeOrigin, Severity, SeverityGate, SwitchMessage};
use crate::observability::metrics;
use crate::resilience::backoff::subscribe_backoff;

/// Result of handling one switch message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied {
        previous: Severity,
        message: SwitchMessage,
    },
    /// An unexpired manual override holds.
    Rejected { current: SwitchMessage },
    /// The stored state could not be decoded; nothing was changed.
    Ignored { stored: String },
}

/// Whether `incoming` may replace `current` at `now`.
pub fn can_apply(incoming: &SwitchMessage, current: Option<&SwitchMessage>, now: DateTime<Utc>) -> bool {
    match (incoming.origin, current) {
        (_, None) => true,
        (ChangeOrigin::Manual, Some(_)) => true,
        (ChangeOrigin::Automatic, Some(current)) => {
            current.origin == ChangeOrigin::Automatic || current.is_expired_at(now)
        }
    }
}

#[derive(Debug)]
pub struct ChannelConsumer {
    client: Arc<CoordinationClient>,
    gate: Arc<SeverityGate>,
}

impl ChannelConsumer {
    pub fn new(client: Arc<CoordinationClient>, gate: Arc<SeverityGate>) -> Self {
        Self { client, gate }
    }

    /// Decode and apply one raw channel payload.
    pub async fn handle_message(&self, raw: &str) -> CoordinationResult<ApplyOutcome> {
        let message = SwitchMessage::decode(raw)?;
        self.apply_message(&message).await
    }

    /// Apply `message` if it outranks the stored state.
    pub async fn apply_message(&self, message: &SwitchMessage) -> CoordinationResult<ApplyOutcome> {
        let current = match self.client.read_state().await? {
            StoredState::Absent => None,
            StoredState::Valid(current) => Some(current),
            StoredState::Invalid { raw, error } => {
                tracing::warn!(
                    key = %self.client.keys().state,
                    value = %raw,
                    error = %error,
                    incoming = %message,
                    "Stored level state is unreadable, ignoring switch"
                );
                metrics::record_switch_rejected();
                return Ok(ApplyOutcome::Ignored { stored: raw });
            }
        };

        let now = Utc::now();
        if !can_apply(message, current.as_ref(), now) {
            // Only an unexpired manual override can block.
            if let Some(current) = current {
                tracing::info!(
                    incoming = %message,
                    current = %current,
                    "Manual override still active, ignoring automatic switch"
                );
                metrics::record_switch_rejected();
                return Ok(ApplyOutcome::Rejected { current });
            }
        }

        let previous = self.gate.set(message.severity);
        self.client.write_state(message).await?;
        match message.origin {
            ChangeOrigin::Automatic => self.client.write_last_switch(now).await?,
            ChangeOrigin::Manual => {
                self.client.clear_last_switch().await?;
            }
        }

        tracing::info!(
            previous = %previous,
            level = %message.severity,
            origin = %message.origin,
            expires_at = %message.expires_at,
            "Log level switched"
        );
        metrics::record_switch_applied(message.origin, message.severity);

        Ok(ApplyOutcome::Applied {
            previous,
            message: message.clone(),
        })
    }

    async fn handle_logged(&self, raw: &str) {
        match self.handle_message(raw).await {
            Ok(_) => {}
            Err(CoordinationError::Message(e)) => {
                tracing::warn!(payload = %raw, error = %e, "Ignoring invalid level change message");
            }
            Err(e) => {
                tracing::error!(payload = %raw, error = %e, "Failed to apply level change");
            }
        }
    }

    /// Consume the channel until shutdown, resubscribing with backoff on failure.
    pub async fn consume(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let channel = self.client.keys().channel.clone();
        let mut attempt: u32 = 0;

        loop {
            match self.client.subscribe().await {
                Ok(mut subscription) => {
                    attempt = 0;
                    tracing::info!(channel = %channel, "Subscribed to level change channel");

                    loop {
                        tokio::select! {
                            _ = shutdown.recv() => {
                                tracing::info!(channel = %channel, "Unsubscribing from level change channel");
                                return;
                            }
                            payload = subscription.next() => match payload {
                                Some(raw) => self.handle_logged(&raw).await,
                                None => {
                                    tracing::warn!(channel = %channel, "Level change subscription closed");
                                    break;
                                }
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(channel = %channel, error = %e, attempt, "Failed to subscribe to level change channel");
                }
            }

            attempt = attempt.saturating_add(1);
            let delay = subscribe_backoff(attempt);
            tracing::debug!(retry_in_ms = delay.as_millis() as u64, "Resubscribing after backoff");

            tokio::select! {
                _ = shutdown.recv() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
