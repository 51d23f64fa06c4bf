//! Shared-store contract.
//!
//! # Responsibilities
//! - GET/SET string values with TTL
//! - Publish/subscribe on a named channel
//!
//! # Design Decisions
//! - Object-safe async trait so backends plug in as `Arc<dyn SharedStore>`
//! - A subscription is a plain stream of payloads; backends pump into a
//!   broadcast channel, dropping the subscription unsubscribes

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::coordination::error::StoreError;

/// Key-value store with TTL plus pub/sub, shared by every instance.
#[async_trait]
pub trait SharedStore: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns whether a key was removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Returns the number of subscribers that received the payload.
    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, StoreError>;

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError>;
}

/// Live subscription to one channel.
#[derive(Debug)]
pub struct Subscription {
    channel: String,
    rx: broadcast::Receiver<String>,
}

impl Subscription {
    pub fn new(channel: impl Into<String>, rx: broadcast::Receiver<String>) -> Self {
        Self {
            channel: channel.into(),
            rx,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next payload, or `None` once the channel is closed.
    ///
    /// Payloads lost to a slow reader are skipped with a warning; the
    /// reconciler picks up whatever state they carried.
    pub async fn next(&mut self) -> Option<String> {
        loop {
            match self.rx.recv().await {
                Ok(payload) => return Some(payload),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(channel = %self.channel, skipped, "Subscription lagged, messages dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
