//! Request tracking middleware.
//! Records latency and server-error outcome of every request into the registry.

use std::sync::Arc;
use std::time::Instant;

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use crate::admin::ADMIN_PREFIX;
use crate::health::MetricsRegistry;

/// Attach with `axum::middleware::from_fn_with_state(registry, track_requests)`.
pub async fn track_requests(
    State(registry): State<Arc<MetricsRegistry>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if req.uri().path().starts_with(ADMIN_PREFIX) {
        return next.run(req).await;
    }

    let start = Instant::now();
    let response = next.run(req).await;
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

    registry.record_request(latency_ms, response.status().is_server_error());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroUsize;

    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app(registry: Arc<MetricsRegistry>) -> Router {
        Router::new()
            .route("/ok", get(|| async { "ok" }))
            .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/api/smart-logs/status", get(|| async { "status" }))
            .layer(middleware::from_fn_with_state(registry, track_requests))
    }

    async fn hit(app: Router, path: &str) -> StatusCode {
        let req = Request::builder().uri(path).body(Body::empty()).unwrap();
        app.oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_records_outcomes_and_skips_admin_paths() {
        let registry = Arc::new(MetricsRegistry::new(NonZeroUsize::new(10).unwrap(), 60));
        let app = app(registry.clone());

        assert_eq!(hit(app.clone(), "/ok").await, StatusCode::OK);
        assert_eq!(hit(app.clone(), "/boom").await, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(hit(app.clone(), "/api/smart-logs/status").await, StatusCode::OK);
        assert_eq!(hit(app, "/missing").await, StatusCode::NOT_FOUND);

        assert_eq!(registry.request_metrics_count(), 3);
        assert_eq!(registry.count_requests(|r| r.is_server_error), 1);
    }
}
