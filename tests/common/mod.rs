//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use smartlog::coordination::{InMemoryStore, SharedStore, StoreError, Subscription};
use smartlog::SmartLogConfig;

/// Config with short timers and a low threshold.
pub fn test_config() -> SmartLogConfig {
    SmartLogConfig {
        app_name: "orders".into(),
        environment: "test".into(),
        error_threshold: 5,
        detection_interval_secs: 3600,
        reconcile_interval_secs: 3600,
        store_timeout_ms: 1000,
        ..SmartLogConfig::default()
    }
}

/// Delegates to an [`InMemoryStore`] after a fixed delay on every call.
pub struct SlowStore {
    inner: Arc<InMemoryStore>,
    delay: Duration,
}

impl SlowStore {
    pub fn new(inner: Arc<InMemoryStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl SharedStore for SlowStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete(key).await
    }

    async fn publish(&self, channel: &str, payload: &str) -> Result<usize, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.publish(channel, payload).await
    }

    async fn subscribe(&self, channel: &str) -> Result<Subscription, StoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.subscribe(channel).await
    }
}

/// Fails every call.
pub struct FailingStore;

fn injected() -> StoreError {
    StoreError::Unavailable("injected failure".into())
}

#[async_trait]
impl SharedStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(injected())
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), StoreError> {
        Err(injected())
    }

    async fn delete(&self, _key: &str) -> Result<bool, StoreError> {
        Err(injected())
    }

    async fn publish(&self, _channel: &str, _payload: &str) -> Result<usize, StoreError> {
        Err(injected())
    }

    async fn subscribe(&self, _channel: &str) -> Result<Subscription, StoreError> {
        Err(injected())
    }
}

/// Poll `condition` every 10ms for up to 2s.
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

pub async fn wait_for_subscribers(store: &InMemoryStore, channel: &str, count: usize) {
    assert!(
        wait_until(move || async move { store.subscriber_count(channel) >= count }).await,
        "expected {count} subscribers on {channel}"
    );
}
