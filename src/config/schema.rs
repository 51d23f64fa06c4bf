//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::level::Severity;

/// Root configuration for the verbosity controller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SmartLogConfig {
    /// Application name; combined with `environment` to namespace shared keys.
    pub app_name: String,

    /// Deployment environment (dev, homol, prd, ...).
    pub environment: String,

    /// Maximum retained observations per buffer.
    pub buffer_capacity: usize,

    /// Sliding window, in seconds, used for counting and eviction.
    pub window_seconds: u64,

    /// Errors within the window that trigger high verbosity.
    pub error_threshold: u32,

    /// Quiet steady-state level.
    pub economy_level: Severity,

    /// Detailed level used during incidents. Must be more verbose than `economy_level`.
    pub high_verbosity_level: Severity,

    /// Interval between detection cycles in seconds.
    pub detection_interval_secs: u64,

    /// Minimum time an automatic change holds before it can be quieted again.
    pub minimum_high_verbosity_minutes: u32,

    /// Interval between reconciliation passes in seconds.
    pub reconcile_interval_secs: u64,

    /// Publish switches through the shared store. When off, changes are local-only.
    pub coordination_enabled: bool,

    /// Run the detection loop.
    pub auto_detection: bool,

    /// Deadline for a single shared-store call in milliseconds.
    pub store_timeout_ms: u64,

    /// TTL of the stored state and last-switch keys, in days.
    pub state_ttl_days: u64,

    /// Log filtering mode.
    pub filter: FilterMode,

    /// Admin API settings.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for SmartLogConfig {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            environment: "dev".to_string(),
            buffer_capacity: 1000,
            window_seconds: 60,
            error_threshold: 30,
            economy_level: Severity::Warning,
            high_verbosity_level: Severity::Information,
            detection_interval_secs: 7200,
            minimum_high_verbosity_minutes: 15,
            reconcile_interval_secs: 300,
            coordination_enabled: true,
            auto_detection: true,
            store_timeout_ms: 2000,
            state_ttl_days: 7,
            filter: FilterMode::default(),
            admin: AdminConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl SmartLogConfig {
    /// Quick setup for local development: noisy thresholds, short timers, no coordination.
    pub fn development() -> Self {
        Self {
            economy_level: Severity::Error,
            high_verbosity_level: Severity::Debug,
            detection_interval_secs: 30,
            window_seconds: 60,
            error_threshold: 5,
            minimum_high_verbosity_minutes: 2,
            coordination_enabled: false,
            ..Self::default()
        }
    }

    /// Production defaults.
    pub fn production() -> Self {
        Self {
            environment: "prd".to_string(),
            economy_level: Severity::Error,
            high_verbosity_level: Severity::Information,
            detection_interval_secs: 120,
            window_seconds: 300,
            error_threshold: 30,
            minimum_high_verbosity_minutes: 15,
            coordination_enabled: true,
            ..Self::default()
        }
    }

    /// Namespace for shared-store keys and the channel: `"{app_name}-{environment}"`, lowercased.
    pub fn app_identity(&self) -> String {
        format!("{}-{}", self.app_name.trim(), self.environment.trim()).to_lowercase()
    }

    pub fn detection_interval(&self) -> Duration {
        Duration::from_secs(self.detection_interval_secs)
    }

    pub fn reconcile_interval(&self) -> Duration {
        Duration::from_secs(self.reconcile_interval_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.state_ttl_days.saturating_mul(24 * 60 * 60))
    }
}

/// How log events are admitted.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FilterMode {
    /// Admit only events at or above the live gate.
    #[default]
    Gate,
    /// Also admit any event carrying one of `properties` set to `true`.
    Force {
        #[serde(default = "default_force_properties")]
        properties: Vec<String>,
    },
}

fn default_force_properties() -> Vec<String> {
    vec!["force".to_string()]
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the admin API.
    pub enabled: bool,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives applied before the severity gate (e.g. "trace,hyper=warn").
    pub directives: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            directives: "trace".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
