//! Admin HTTP server.
//!
//! # Responsibilities
//! - Build the Axum router for the admin API
//! - Wire up middleware (tracing)
//! - Serve on a listener until shutdown

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::admin::{handlers::AdminState, setup_admin_router};

/// HTTP server for the admin API.
pub struct AdminServer {
    router: Router,
}

impl AdminServer {
    pub fn new(state: AdminState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AdminState) -> Router {
        setup_admin_router(state).layer(TraceLayer::new_for_http())
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Admin server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Admin server stopped");
        Ok(())
    }
}
