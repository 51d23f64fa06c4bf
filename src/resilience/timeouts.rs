//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap shared-store calls with a deadline
//! - Cancel the in-flight call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from backend errors

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::coordination::StoreError;

/// Run `fut` with a deadline, mapping expiry to [`StoreError::Timeout`].
pub async fn with_timeout<T, F>(op: &'static str, after: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(op, timeout_ms = after.as_millis() as u64, "Shared store call timed out");
            Err(StoreError::Timeout {
                op,
                after_ms: after.as_millis() as u64,
            })
        }
    }
}
