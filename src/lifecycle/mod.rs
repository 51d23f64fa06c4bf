//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validate config → Build gate, registry, coordination, detector → Spawn tasks
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → every loop exits after its current unit of work
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then background tasks
//! - Background tasks hold a receiver each; dropping them unsubscribes

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::SmartLog;
