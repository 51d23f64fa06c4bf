//! SmartLog daemon.
//!
//! Runs the controller with the bundled in-process store and serves the admin
//! API. Embedding services use the library directly and plug their own
//! [`SharedStore`](smartlog::coordination::SharedStore) into [`SmartLog::new`].
//!
//! ```text
//!   tracing events ──▶ MetricsLayer ──▶ MetricsRegistry ◀── track_requests
//!                                             │
//!                                             ▼
//!                                      EconomyDetector (timer)
//!                                             │ hysteresis
//!                                             ▼
//!   POST /level ──────────────────────▶ LevelSwitcher ──▶ channel
//!                                                            │
//!                          ChannelConsumer ◀─────────────────┘
//!                                │ precedence
//!                                ▼
//!   Reconciler (timer) ──▶ SeverityGate ──▶ SeverityFilter ──▶ fmt output
//! ```

use tokio::net::TcpListener;

use smartlog::config::load_from_env;
use smartlog::http::AdminServer;
use smartlog::lifecycle::signals::shutdown_signal;
use smartlog::observability::{init_logging, metrics};
use smartlog::{Shutdown, SmartLog};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_from_env()?;
    let smartlog = SmartLog::in_memory(config)?;
    let config = smartlog.config().clone();

    init_logging(
        &config.observability,
        config.filter.clone(),
        smartlog.gate().clone(),
        smartlog.registry().clone(),
    )?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        app = %config.app_identity(),
        instance_id = %smartlog.instance_id(),
        economy_level = %config.economy_level,
        high_verbosity_level = %config.high_verbosity_level,
        coordination_enabled = config.coordination_enabled,
        "smartlog starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let mut tasks = smartlog.start(&shutdown);

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        let server = AdminServer::new(smartlog.admin_state());
        let rx = shutdown.subscribe();
        tasks.push(tokio::spawn(async move {
            if let Err(e) = server.run(listener, rx).await {
                tracing::error!(error = %e, "Admin server failed");
            }
        }));
    }

    shutdown_signal().await;
    shutdown.trigger();

    for task in tasks {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Background task panicked");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
