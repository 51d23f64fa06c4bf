//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Shared-store call:
//!     → timeouts.rs (enforce per-call deadline)
//!     → On timeout: StoreError::Timeout, caller logs and ends its cycle
//!
//! Subscription loss:
//!     → backoff.rs (jittered exponential delay)
//!     → resubscribe until shutdown
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every store call has a deadline
//! - Store calls are never retried inline; the next timer tick is the retry
//! - Only the long-lived subscription retries, with backoff

pub mod backoff;
pub mod timeouts;
