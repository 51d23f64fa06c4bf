//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! Host application request
//!     → middleware::track_requests (latency, 5xx) → MetricsRegistry
//!
//! Operator request
//!     → server.rs (AdminServer, TraceLayer)
//!     → admin handlers
//! ```

pub mod middleware;
pub mod server;

pub use middleware::track_requests;
pub use server::AdminServer;
