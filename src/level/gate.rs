//! Process-wide minimum severity.
//!
//! # Responsibilities
//! - Answer "is this severity admitted?" on every log call
//! - Accept rare writes from the switch appliers
//!
//! # Design Decisions
//! - A single `AtomicU8`; reads are one relaxed load
//! - Created once at startup and shared via `Arc`

use std::sync::atomic::{AtomicU8, Ordering};

use crate::level::Severity;

/// Live minimum severity for this process.
#[derive(Debug)]
pub struct SeverityGate {
    level: AtomicU8,
}

impl SeverityGate {
    pub fn new(initial: Severity) -> Self {
        Self {
            level: AtomicU8::new(initial as u8),
        }
    }

    /// Current minimum severity.
    #[inline]
    pub fn current(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed))
    }

    /// True if an event at `severity` passes the gate.
    #[inline]
    pub fn admits(&self, severity: Severity) -> bool {
        severity as u8 >= self.level.load(Ordering::Relaxed)
    }

    /// Replace the minimum severity, returning the previous one.
    pub fn set(&self, severity: Severity) -> Severity {
        Severity::from_u8(self.level.swap(severity as u8, Ordering::Relaxed))
    }
}
