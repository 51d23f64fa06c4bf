//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, path from SMARTLOG_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SmartLogConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Any validation error is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, parse_config, ConfigError};
pub use schema::{AdminConfig, FilterMode, ObservabilityConfig, SmartLogConfig};
pub use validation::{validate_config, ValidationError};
