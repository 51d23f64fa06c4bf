//! Log level model shared by every subsystem.
//!
//! # Data Flow
//! ```text
//! severity.rs (Severity, ChangeOrigin)
//!     → gate.rs (live minimum severity, read on every log call)
//!     → message.rs (SwitchMessage wire/stored codec)
//! ```
//!
//! # Design Decisions
//! - Lower ordinal = more verbose; every comparison relies on the derived `Ord`
//! - One codec for both the pub/sub payload and the stored state value
//! - The gate is an injected `Arc`, never a global

pub mod gate;
pub mod message;
pub mod severity;

pub use gate::SeverityGate;
pub use message::{MessageError, SwitchMessage};
pub use severity::{ChangeOrigin, Severity};
