//! SmartLog: adaptive log-verbosity controller.
//!
//! Watches recent error volume, raises log verbosity across a fleet while an
//! incident lasts and returns to an economy level afterwards, with manual
//! overrides outranking automatic changes until they expire.

pub mod admin;
pub mod config;
pub mod coordination;
pub mod detection;
pub mod health;
pub mod http;
pub mod level;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::schema::SmartLogConfig;
pub use coordination::{InMemoryStore, SharedStore};
pub use level::{ChangeOrigin, Severity, SeverityGate, SwitchMessage};
pub use lifecycle::{Shutdown, SmartLog};
