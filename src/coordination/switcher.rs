//! Level change producer.
//!
//! # Responsibilities
//! - Build a [`SwitchMessage`] expiring after the requested duration
//! - Publish it on the application channel, or deliver it locally when
//!   coordination is disabled
//! - Validate manual override durations

use std::sync::Arc;

use crate::coordination::client::CoordinationClient;
use crate::coordination::consumer::{ApplyOutcome, ChannelConsumer};
use crate::coordination::error::{CoordinationError, CoordinationResult};
use crate::level::{ChangeOrigin, Severity, SwitchMessage};

/// How a requested switch was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Sent on the channel to `receivers` subscribed instances.
    Published { message: SwitchMessage, receivers: usize },
    /// Handed to this instance's consumer.
    Local { message: SwitchMessage, outcome: ApplyOutcome },
}

impl Dispatch {
    pub fn message(&self) -> &SwitchMessage {
        match self {
            Dispatch::Published { message, .. } | Dispatch::Local { message, .. } => message,
        }
    }

    /// The local consumer refused the switch. A published switch is never
    /// known to be refused here.
    pub fn is_refused(&self) -> bool {
        matches!(self, Dispatch::Local { outcome, .. } if !matches!(outcome, ApplyOutcome::Applied { .. }))
    }
}

/// Where switch messages go.
#[derive(Debug, Clone)]
pub enum Delivery {
    /// Publish to every instance through the shared store.
    Publish(Arc<CoordinationClient>),
    /// Apply on this instance only, through the consumer's precedence rules.
    Local(Arc<ChannelConsumer>),
}

#[derive(Debug, Clone)]
pub struct LevelSwitcher {
    delivery: Delivery,
}

impl LevelSwitcher {
    pub fn new(delivery: Delivery) -> Self {
        Self { delivery }
    }

    pub fn publishing(client: Arc<CoordinationClient>) -> Self {
        Self::new(Delivery::Publish(client))
    }

    pub fn local(consumer: Arc<ChannelConsumer>) -> Self {
        Self::new(Delivery::Local(consumer))
    }

    pub fn is_local(&self) -> bool {
        matches!(self.delivery, Delivery::Local(_))
    }

    /// Request a level change that holds for `duration_minutes`.
    pub async fn switch_level(
        &self,
        severity: Severity,
        origin: ChangeOrigin,
        duration_minutes: u32,
    ) -> CoordinationResult<Dispatch> {
        let message = SwitchMessage::new(severity, origin, duration_minutes);

        match &self.delivery {
            Delivery::Publish(client) => {
                let receivers = client.publish(&message).await?;
                tracing::info!(
                    level = %severity,
                    origin = %origin,
                    duration_minutes,
                    receivers,
                    channel = %client.keys().channel,
                    "Published level change"
                );
                Ok(Dispatch::Published { message, receivers })
            }
            Delivery::Local(consumer) => {
                tracing::info!(
                    level = %severity,
                    origin = %origin,
                    duration_minutes,
                    "Coordination disabled, applying level change locally"
                );
                let outcome = consumer.apply_message(&message).await?;
                Ok(Dispatch::Local { message, outcome })
            }
        }
    }

    /// Operator override. `minutes` must be at least 1.
    pub async fn manual_override(&self, severity: Severity, minutes: i64) -> CoordinationResult<Dispatch> {
        let duration = u32::try_from(minutes)
            .ok()
            .filter(|m| *m >= 1)
            .ok_or(CoordinationError::InvalidDuration(minutes))?;

        self.switch_level(severity, ChangeOrigin::Manual, duration).await
    }
}
