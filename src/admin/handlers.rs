use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SmartLogConfig;
use crate::coordination::{CoordinationError, LevelSwitcher};
use crate::detection::{Decision, EconomyDetector};
use crate::health::{BufferHealthStats, MetricsRegistry};
use crate::level::{Severity, SeverityGate};

/// Shared handles injected into admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub config: Arc<SmartLogConfig>,
    pub instance_id: Uuid,
    pub gate: Arc<SeverityGate>,
    pub registry: Arc<MetricsRegistry>,
    pub detector: Arc<EconomyDetector>,
    pub switcher: Arc<LevelSwitcher>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub instance_id: Uuid,
    pub app: String,
    pub current_level: Severity,
    pub economy_level: Severity,
    pub high_verbosity_level: Severity,
    pub coordination_enabled: bool,
    pub auto_detection: bool,
    pub error_threshold: u32,
    pub window_seconds: u64,
    pub detection_interval_secs: u64,
    pub minimum_high_verbosity_minutes: u32,
    pub last_decision: Decision,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub current_level: Severity,
    #[serde(flatten)]
    pub stats: BufferHealthStats,
}

#[derive(Debug, Deserialize)]
pub struct LevelRequest {
    pub level: String,
    pub time_expiration_in_minute: i64,
}

#[derive(Debug, Serialize)]
pub struct LevelAccepted {
    pub level: Severity,
    pub origin: &'static str,
    pub expires_at: DateTime<Utc>,
    pub local_only: bool,
}

/// Handler error mapped to a JSON body.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn get_status(State(state): State<AdminState>) -> Json<StatusResponse> {
    let config = &state.config;
    Json(StatusResponse {
        instance_id: state.instance_id,
        app: config.app_identity(),
        current_level: state.gate.current(),
        economy_level: config.economy_level,
        high_verbosity_level: config.high_verbosity_level,
        coordination_enabled: config.coordination_enabled,
        auto_detection: config.auto_detection,
        error_threshold: config.error_threshold,
        window_seconds: config.window_seconds,
        detection_interval_secs: config.detection_interval_secs,
        minimum_high_verbosity_minutes: config.minimum_high_verbosity_minutes,
        last_decision: state.detector.last_decision().as_ref().clone(),
    })
}

pub async fn get_metrics(State(state): State<AdminState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        current_level: state.gate.current(),
        stats: state.registry.health_stats(),
    })
}

pub async fn get_levels() -> Json<Vec<&'static str>> {
    Json(Severity::names())
}

pub async fn post_level(
    State(state): State<AdminState>,
    Json(request): Json<LevelRequest>,
) -> Result<(StatusCode, Json<LevelAccepted>), ApiError> {
    let level: Severity = request
        .level
        .parse()
        .map_err(|e: crate::level::severity::ParseLevelError| ApiError::BadRequest(e.to_string()))?;

    let dispatch = state
        .switcher
        .manual_override(level, request.time_expiration_in_minute)
        .await
        .map_err(|e| match e {
            CoordinationError::InvalidDuration(_) => ApiError::BadRequest(e.to_string()),
            other => {
                tracing::error!(error = %other, level = %level, "Manual level change failed");
                ApiError::Unavailable(other.to_string())
            }
        })?;

    tracing::info!(
        level = %level,
        minutes = request.time_expiration_in_minute,
        "Manual level change requested"
    );
    let message = dispatch.message();

    Ok((
        StatusCode::ACCEPTED,
        Json(LevelAccepted {
            level: message.severity,
            origin: message.origin.as_str(),
            expires_at: message.expires_at,
            local_only: state.switcher.is_local(),
        }),
    ))
}
