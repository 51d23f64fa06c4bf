//! Distributed coordination subsystem.
//!
//! # Data Flow
//! ```text
//! Producer (switcher.rs):
//!     switch_level / manual_override
//!     → SwitchMessage (expires now + duration)
//!     → publish on {app}:smartlog:level_change_channel
//!
//! Consumer (consumer.rs), every instance:
//!     channel payload
//!     → precedence check against stored state
//!     → gate.set + write state (+ last switch timestamp)
//!
//! Reconciler (reconciler.rs), every instance:
//!     timer → read stored state → gate.set if differs and unexpired
//! ```
//!
//! # Design Decisions
//! - The store is a trait object (store.rs); memory.rs is the bundled backend
//! - Every store call goes through client.rs and carries a deadline
//! - Weak consistency: instances converge through the reconciler, not locks

pub mod client;
pub mod consumer;
pub mod error;
pub mod keys;
pub mod memory;
pub mod reconciler;
pub mod store;
pub mod switcher;

pub use client::{CoordinationClient, StoredState};
pub use consumer::{can_apply, ApplyOutcome, ChannelConsumer};
pub use error::{CoordinationError, CoordinationResult, StoreError};
pub use keys::StoreKeys;
pub use memory::InMemoryStore;
pub use reconciler::{Reconciler, SyncOutcome};
pub use store::{SharedStore, Subscription};
pub use switcher::{Delivery, Dispatch, LevelSwitcher};
