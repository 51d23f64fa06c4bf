//! Admin API.
//!
//! ```text
//! GET  /api/smart-logs/status   live level, configured levels, last decision
//! GET  /api/smart-logs/metrics  windowed counts and buffer health
//! GET  /api/smart-logs/levels   accepted severity names
//! POST /api/smart-logs/level    manual override {level, time_expiration_in_minute}
//! ```

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use self::handlers::*;

/// Path prefix of every admin route; request tracking skips it.
pub const ADMIN_PREFIX: &str = "/api/smart-logs";

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/api/smart-logs/status", get(get_status))
        .route("/api/smart-logs/metrics", get(get_metrics))
        .route("/api/smart-logs/levels", get(get_levels))
        .route("/api/smart-logs/level", post(post_level))
        .with_state(state)
}
