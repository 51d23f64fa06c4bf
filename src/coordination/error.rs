//! Error types for coordination.

use thiserror::Error;

use crate::level::MessageError;

/// Errors returned by a [`SharedStore`](crate::coordination::SharedStore) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend not reachable or not connected.
    #[error("Shared store unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its deadline.
    #[error("Shared store {op} timed out after {after_ms}ms")]
    Timeout { op: &'static str, after_ms: u64 },

    /// Backend rejected or failed the command.
    #[error("Shared store error: {0}")]
    Backend(String),
}

/// Errors surfaced by switch producers and consumers.
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid switch message: {0}")]
    Message(#[from] MessageError),

    /// Override duration must be at least one minute.
    #[error("Duration must be at least 1 minute, got {0}")]
    InvalidDuration(i64),
}

/// Result type for coordination operations.
pub type CoordinationResult<T> = Result<T, CoordinationError>;
