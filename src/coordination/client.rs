//! Typed access to the shared store.
//!
//! # Responsibilities
//! - Map level state onto the namespaced keys and channel
//! - Enforce the per-call deadline on every store operation
//! - Decode stored values into [`SwitchMessage`] and instants
//!
//! # Design Decisions
//! - One client per application identity, shared via Arc
//! - Stored values are written with the long state TTL so idle fleets forget

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::SmartLogConfig;
use crate::coordination::error::StoreError;
use crate::coordination::keys::{format_instant, parse_instant, StoreKeys};
use crate::coordination::store::{SharedStore, Subscription};
use crate::level::{MessageError, SwitchMessage};
use crate::resilience::timeouts::with_timeout;

/// What the state key currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredState {
    Absent,
    Valid(SwitchMessage),
    Invalid { raw: String, error: MessageError },
}

#[derive(Clone)]
pub struct CoordinationClient {
    store: Arc<dyn SharedStore>,
    keys: StoreKeys,
    timeout: Duration,
    ttl: Duration,
}

impl CoordinationClient {
    pub fn new(store: Arc<dyn SharedStore>, keys: StoreKeys, timeout: Duration, ttl: Duration) -> Self {
        Self {
            store,
            keys,
            timeout,
            ttl,
        }
    }

    pub fn from_config(store: Arc<dyn SharedStore>, config: &SmartLogConfig) -> Self {
        Self::new(
            store,
            StoreKeys::for_app(&config.app_identity()),
            config.store_timeout(),
            config.state_ttl(),
        )
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    pub async fn read_state(&self) -> Result<StoredState, StoreError> {
        let raw = with_timeout("get", self.timeout, self.store.get(&self.keys.state)).await?;
        Ok(match raw {
            None => StoredState::Absent,
            Some(raw) => match SwitchMessage::decode(&raw) {
                Ok(message) => StoredState::Valid(message),
                Err(error) => StoredState::Invalid { raw, error },
            },
        })
    }

    pub async fn write_state(&self, message: &SwitchMessage) -> Result<(), StoreError> {
        let encoded = message.encode();
        with_timeout(
            "set",
            self.timeout,
            self.store.set(&self.keys.state, &encoded, self.ttl),
        )
        .await
    }

    /// Instant of the last automatic switch. An unreadable value counts as absent.
    pub async fn read_last_switch(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let raw = with_timeout("get", self.timeout, self.store.get(&self.keys.last_switch)).await?;
        Ok(raw.and_then(|raw| {
            let parsed = parse_instant(&raw);
            if parsed.is_none() {
                tracing::warn!(key = %self.keys.last_switch, value = %raw, "Ignoring unparseable last switch timestamp");
            }
            parsed
        }))
    }

    pub async fn write_last_switch(&self, at: DateTime<Utc>) -> Result<(), StoreError> {
        let value = format_instant(at);
        with_timeout(
            "set",
            self.timeout,
            self.store.set(&self.keys.last_switch, &value, self.ttl),
        )
        .await
    }

    pub async fn clear_last_switch(&self) -> Result<bool, StoreError> {
        with_timeout("delete", self.timeout, self.store.delete(&self.keys.last_switch)).await
    }

    pub async fn publish(&self, message: &SwitchMessage) -> Result<usize, StoreError> {
        let encoded = message.encode();
        with_timeout(
            "publish",
            self.timeout,
            self.store.publish(&self.keys.channel, &encoded),
        )
        .await
    }

    pub async fn subscribe(&self) -> Result<Subscription, StoreError> {
        with_timeout("subscribe", self.timeout, self.store.subscribe(&self.keys.channel)).await
    }
}

impl fmt::Debug for CoordinationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinationClient")
            .field("channel", &self.keys.channel)
            .field("timeout_ms", &self.timeout.as_millis())
            .field("ttl_secs", &self.ttl.as_secs())
            .finish()
    }
}
