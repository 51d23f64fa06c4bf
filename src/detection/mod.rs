//! Detection subsystem.
//!
//! # Data Flow
//! ```text
//! timer (detector.rs)
//!     → registry.count_recent_logs
//!     → decision.rs (threshold rule) → last_decision
//!     → equal to gate? stop
//!     → hysteresis.rs (escalate now, de-escalate after minimum duration)
//!     → LevelSwitcher::switch_level(Automatic)
//! ```
//!
//! # Design Decisions
//! - Rules are pure functions; the detector only wires them to state
//! - At most one cycle per instance at a time

pub mod decision;
pub mod detector;
pub mod hysteresis;

pub use decision::{decide, Decision, Thresholds};
pub use detector::{CycleOutcome, EconomyDetector};
pub use hysteresis::{can_switch_after_minimum_time, requires_minimum_duration, HysteresisGate, Verdict};
