use std::sync::Arc;
use std::time::Duration;

use hostwatch_core::registry::{RegistryConfig, ServerRegistry};
use hostwatch_core::scheduler::Scheduler;
use hostwatch_db::PgServerStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is an `Arc` or wraps one.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used directly by the health check.
    pub pool: hostwatch_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Server records over the shared pool.
    pub registry: ServerRegistry<PgServerStore>,
    /// The single active-host sampling scheduler for this process.
    pub scheduler: Scheduler<PgServerStore>,
}

impl AppState {
    /// Wire the registry and an idle scheduler over `pool`.
    pub fn new(pool: hostwatch_db::DbPool, config: ServerConfig) -> Self {
        let store = Arc::new(PgServerStore::new(pool.clone()));
        let registry = ServerRegistry::new(
            store,
            RegistryConfig {
                default_threshold: config.default_threshold,
            },
        );
        let scheduler = Scheduler::new(
            registry.clone(),
            Duration::from_secs(config.scheduler_interval_secs),
        );

        Self {
            pool,
            config: Arc::new(config),
            registry,
            scheduler,
        }
    }
}
