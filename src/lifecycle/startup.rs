//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize all components in dependency order
//! - Start background tasks (consumer, reconciler, detector)
//!
//! # Design Decisions
//! - Fail fast: an invalid configuration is refused
//! - Components are built once and shared via Arc; no global singletons
//! - With coordination disabled the provided store is replaced by a
//!   process-local one and switches apply locally

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::admin::handlers::AdminState;
use crate::config::{validate_config, ConfigError, SmartLogConfig};
use crate::coordination::{
    ChannelConsumer, CoordinationClient, InMemoryStore, LevelSwitcher, Reconciler, SharedStore,
};
use crate::detection::EconomyDetector;
use crate::health::MetricsRegistry;
use crate::level::SeverityGate;
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

/// Fully wired controller for one process.
#[derive(Debug)]
pub struct SmartLog {
    config: Arc<SmartLogConfig>,
    instance_id: Uuid,
    gate: Arc<SeverityGate>,
    registry: Arc<MetricsRegistry>,
    client: Arc<CoordinationClient>,
    consumer: Arc<ChannelConsumer>,
    switcher: Arc<LevelSwitcher>,
    detector: Arc<EconomyDetector>,
    reconciler: Arc<Reconciler>,
}

impl SmartLog {
    pub fn new(config: SmartLogConfig, store: Arc<dyn SharedStore>) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let registry = MetricsRegistry::from_config(&config)
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let store: Arc<dyn SharedStore> = if config.coordination_enabled {
            store
        } else {
            tracing::info!("Coordination disabled, level changes stay on this instance");
            Arc::new(InMemoryStore::new())
        };

        let gate = Arc::new(SeverityGate::new(config.economy_level));
        let registry = Arc::new(registry);
        let client = Arc::new(CoordinationClient::from_config(store, &config));
        let consumer = Arc::new(ChannelConsumer::new(client.clone(), gate.clone()));
        let switcher = Arc::new(if config.coordination_enabled {
            LevelSwitcher::publishing(client.clone())
        } else {
            LevelSwitcher::local(consumer.clone())
        });
        let detector = Arc::new(EconomyDetector::new(
            &config,
            registry.clone(),
            gate.clone(),
            client.clone(),
            switcher.clone(),
        ));
        let reconciler = Arc::new(Reconciler::new(
            client.clone(),
            gate.clone(),
            config.reconcile_interval(),
        ));

        metrics::set_current_level(gate.current());

        Ok(Self {
            config: Arc::new(config),
            instance_id: Uuid::new_v4(),
            gate,
            registry,
            client,
            consumer,
            switcher,
            detector,
            reconciler,
        })
    }

    /// Single-node setup backed by [`InMemoryStore`].
    pub fn in_memory(config: SmartLogConfig) -> Result<Self, ConfigError> {
        Self::new(config, Arc::new(InMemoryStore::new()))
    }

    pub fn config(&self) -> &Arc<SmartLogConfig> {
        &self.config
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn gate(&self) -> &Arc<SeverityGate> {
        &self.gate
    }

    pub fn registry(&self) -> &Arc<MetricsRegistry> {
        &self.registry
    }

    pub fn client(&self) -> &Arc<CoordinationClient> {
        &self.client
    }

    pub fn consumer(&self) -> &Arc<ChannelConsumer> {
        &self.consumer
    }

    pub fn switcher(&self) -> &Arc<LevelSwitcher> {
        &self.switcher
    }

    pub fn detector(&self) -> &Arc<EconomyDetector> {
        &self.detector
    }

    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    pub fn admin_state(&self) -> AdminState {
        AdminState {
            config: self.config.clone(),
            instance_id: self.instance_id,
            gate: self.gate.clone(),
            registry: self.registry.clone(),
            detector: self.detector.clone(),
            switcher: self.switcher.clone(),
        }
    }

    /// Spawn the background tasks. Each stops when `shutdown` fires.
    pub fn start(&self, shutdown: &Shutdown) -> Vec<JoinHandle<()>> {
        let mut tasks = Vec::new();

        if self.config.coordination_enabled {
            tasks.push(tokio::spawn(self.consumer.clone().consume(shutdown.subscribe())));
            tasks.push(tokio::spawn(self.reconciler.clone().run(shutdown.subscribe())));
        }

        if self.config.auto_detection {
            tasks.push(tokio::spawn(self.detector.clone().run(shutdown.subscribe())));
        } else {
            tracing::info!("Automatic detection disabled");
        }

        tracing::info!(
            app = %self.config.app_identity(),
            instance_id = %self.instance_id,
            level = %self.gate.current(),
            tasks = tasks.len(),
            "SmartLog started"
        );
        tasks
    }
}
