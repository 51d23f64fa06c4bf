//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacity, window, intervals > 0)
//! - Check level ordering (high verbosity strictly more verbose than economy)
//! - Require an application identity
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SmartLogConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{FilterMode, SmartLogConfig};
use crate::level::Severity;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("buffer_capacity must be greater than zero")]
    ZeroCapacity,

    #[error("window_seconds must be greater than zero")]
    ZeroWindow,

    #[error("error_threshold must be greater than zero")]
    ZeroThreshold,

    #[error("detection_interval_secs must be greater than zero")]
    ZeroDetectionInterval,

    #[error("reconcile_interval_secs must be greater than zero")]
    ZeroReconcileInterval,

    #[error("minimum_high_verbosity_minutes must be greater than zero")]
    ZeroMinimumDuration,

    #[error("store_timeout_ms must be greater than zero")]
    ZeroStoreTimeout,

    #[error("state_ttl_days must be greater than zero")]
    ZeroStateTtl,

    #[error("app_name and environment are required")]
    MissingIdentity,

    #[error("high_verbosity_level ({high}) must be more verbose than economy_level ({economy})")]
    LevelOrder { economy: Severity, high: Severity },

    #[error("force filter mode needs at least one property name")]
    EmptyForceProperties,

    #[error("coordination must stay enabled in environment '{0}' to propagate levels across instances")]
    CoordinationRequired(String),

    #[error("{field} is not a valid socket address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &SmartLogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.buffer_capacity == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }
    if config.window_seconds == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if config.error_threshold == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    if config.detection_interval_secs == 0 {
        errors.push(ValidationError::ZeroDetectionInterval);
    }
    if config.reconcile_interval_secs == 0 {
        errors.push(ValidationError::ZeroReconcileInterval);
    }
    if config.minimum_high_verbosity_minutes == 0 {
        errors.push(ValidationError::ZeroMinimumDuration);
    }
    if config.store_timeout_ms == 0 {
        errors.push(ValidationError::ZeroStoreTimeout);
    }
    if config.state_ttl_days == 0 {
        errors.push(ValidationError::ZeroStateTtl);
    }
    if config.app_name.trim().is_empty() || config.environment.trim().is_empty() {
        errors.push(ValidationError::MissingIdentity);
    }
    if !config
        .high_verbosity_level
        .is_more_verbose_than(config.economy_level)
    {
        errors.push(ValidationError::LevelOrder {
            economy: config.economy_level,
            high: config.high_verbosity_level,
        });
    }
    if let FilterMode::Force { properties } = &config.filter {
        if properties.iter().all(|p| p.trim().is_empty()) {
            errors.push(ValidationError::EmptyForceProperties);
        }
    }
    if config.environment.eq_ignore_ascii_case("prd") && !config.coordination_enabled {
        errors.push(ValidationError::CoordinationRequired(config.environment.clone()));
    }
    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "admin.bind_address",
            value: config.admin.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(validate_config(&SmartLogConfig::default()), Ok(()));
        assert_eq!(validate_config(&SmartLogConfig::development()), Ok(()));
        assert_eq!(validate_config(&SmartLogConfig::production()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let config = SmartLogConfig {
            buffer_capacity: 0,
            window_seconds: 0,
            error_threshold: 0,
            app_name: "  ".into(),
            ..SmartLogConfig::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroCapacity));
        assert!(errors.contains(&ValidationError::ZeroWindow));
        assert!(errors.contains(&ValidationError::ZeroThreshold));
        assert!(errors.contains(&ValidationError::MissingIdentity));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_levels_must_be_strictly_ordered() {
        let config = SmartLogConfig {
            economy_level: Severity::Information,
            high_verbosity_level: Severity::Information,
            ..SmartLogConfig::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::LevelOrder {
                economy: Severity::Information,
                high: Severity::Information,
            }]
        );
    }

    #[test]
    fn test_production_requires_coordination() {
        let config = SmartLogConfig {
            coordination_enabled: false,
            ..SmartLogConfig::production()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::CoordinationRequired("prd".into())]);
    }

    #[test]
    fn test_force_mode_needs_properties() {
        let config = SmartLogConfig {
            filter: FilterMode::Force { properties: vec![] },
            ..SmartLogConfig::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::EmptyForceProperties]);
    }
}
