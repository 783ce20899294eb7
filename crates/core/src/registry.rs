//! Server registry: transactional CRUD and state transitions over server
//! records, plus the hostname aggregation query.
//!
//! Every operation opens exactly one unit of work through the storage port.
//! Single-record mutations check existence inside that same unit of work
//! before writing. A failed write is rolled back explicitly; any other early
//! exit drops the unit of work, which rolls it back as well.

use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::server::{NewServer, ServerRecord, UpdateServer, SERVER_ENTITY};
use crate::store::{ServerStore, ServerTx, StoreError};
use crate::types::DbId;

/// Threshold used when the caller's value cannot be parsed.
pub const DEFAULT_HOSTNAME_THRESHOLD: i64 = 1;

/// Tunable registry policy.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Substituted for unparsable or negative thresholds.
    pub default_threshold: i64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_threshold: DEFAULT_HOSTNAME_THRESHOLD,
        }
    }
}

/// Entry point for every server record operation.
///
/// Cheaply cloneable; clones share the same store.
pub struct ServerRegistry<S> {
    store: Arc<S>,
    config: RegistryConfig,
}

impl<S> Clone for ServerRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: ServerStore> ServerRegistry<S> {
    pub fn new(store: Arc<S>, config: RegistryConfig) -> Self {
        Self { store, config }
    }

    pub fn default_threshold(&self) -> i64 {
        self.config.default_threshold
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch a single record.
    ///
    /// A storage failure during the lookup is reported as `NotFound`.
    pub async fn get(&self, id: DbId) -> CoreResult<ServerRecord> {
        let mut tx = self.begin().await?;
        let server = load(&mut tx, id).await?;
        commit(tx, "get").await?;
        Ok(server)
    }

    /// All records in insertion (ascending id) order.
    pub async fn list(&self) -> CoreResult<Vec<ServerRecord>> {
        let mut tx = self.begin().await?;
        let servers = match tx.list().await {
            Ok(servers) => servers,
            Err(e) => return Err(abort(tx, "list", e).await),
        };
        commit(tx, "list").await?;

        tracing::debug!(count = servers.len(), "Listed servers");
        Ok(servers)
    }

    /// Hostnames whose number of active records is at most `threshold`,
    /// sorted ascending.
    pub async fn hostnames_below_threshold(&self, threshold: i64) -> CoreResult<Vec<String>> {
        if threshold < 0 {
            return Err(CoreError::Validation(format!(
                "threshold must be non-negative, got {threshold}"
            )));
        }

        let mut tx = self.begin().await?;
        let hostnames = match tx.hostnames_at_or_below(threshold).await {
            Ok(hostnames) => hostnames,
            Err(e) => return Err(abort(tx, "hostnames_below_threshold", e).await),
        };
        commit(tx, "hostnames_below_threshold").await?;

        tracing::debug!(threshold, count = hostnames.len(), "Aggregated hostnames");
        Ok(hostnames)
    }

    /// Parse a caller-supplied threshold, falling back to the configured
    /// default when it is not a non-negative integer.
    pub fn resolve_threshold(&self, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(threshold) if threshold >= 0 => threshold,
            Ok(threshold) => {
                tracing::warn!(
                    threshold,
                    default = self.config.default_threshold,
                    "Negative threshold, using default"
                );
                self.config.default_threshold
            }
            Err(e) => {
                tracing::warn!(
                    raw,
                    error = %e,
                    default = self.config.default_threshold,
                    "Unparsable threshold, using default"
                );
                self.config.default_threshold
            }
        }
    }

    /// IP addresses of every active record, in ascending id order.
    pub async fn active_ips(&self) -> CoreResult<Vec<String>> {
        let mut tx = self.begin().await?;
        let ips = match tx.active_ips().await {
            Ok(ips) => ips,
            Err(e) => return Err(abort(tx, "active_ips", e).await),
        };
        commit(tx, "active_ips").await?;
        Ok(ips)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub async fn create(&self, input: NewServer) -> CoreResult<ServerRecord> {
        input.validate()?;

        let mut tx = self.begin().await?;
        let server = match tx.insert(&input).await {
            Ok(server) => server,
            Err(e) => return Err(abort(tx, "create", e).await),
        };
        commit(tx, "create").await?;

        tracing::info!(
            server_id = server.id,
            hostname = %server.hostname,
            active = server.active,
            "Server created"
        );
        Ok(server)
    }

    /// Replace the supplied fields of an existing record.
    ///
    /// Returns the row as written by storage, not the request echoed back.
    pub async fn update(&self, id: DbId, input: UpdateServer) -> CoreResult<ServerRecord> {
        let mut tx = self.begin().await?;
        let current = load(&mut tx, id).await?;

        let fields = input.apply_to(&current);
        fields.validate()?;

        let server = match tx.update(id, &fields).await {
            Ok(Some(server)) => server,
            Ok(None) => return Err(vanished(tx, "update", id).await),
            Err(e) => return Err(abort(tx, "update", e).await),
        };
        commit(tx, "update").await?;

        tracing::info!(server_id = id, hostname = %server.hostname, "Server updated");
        Ok(server)
    }

    pub async fn enable(&self, id: DbId) -> CoreResult<ServerRecord> {
        self.set_active(id, true).await
    }

    pub async fn disable(&self, id: DbId) -> CoreResult<ServerRecord> {
        self.set_active(id, false).await
    }

    pub async fn delete(&self, id: DbId) -> CoreResult<()> {
        let mut tx = self.begin().await?;
        load(&mut tx, id).await?;

        match tx.delete(id).await {
            Ok(0) => return Err(vanished(tx, "delete", id).await),
            Ok(_) => {}
            Err(e) => return Err(abort(tx, "delete", e).await),
        }
        commit(tx, "delete").await?;

        tracing::info!(server_id = id, "Server deleted");
        Ok(())
    }

    /// Load, flip `active`, and persist only that column.
    async fn set_active(&self, id: DbId, active: bool) -> CoreResult<ServerRecord> {
        let operation = if active { "enable" } else { "disable" };

        let mut tx = self.begin().await?;
        let mut server = load(&mut tx, id).await?;
        if active {
            server.enable();
        } else {
            server.disable();
        }

        let server = match tx.set_active(id, server.active).await {
            Ok(Some(server)) => server,
            Ok(None) => return Err(vanished(tx, operation, id).await),
            Err(e) => return Err(abort(tx, operation, e).await),
        };
        commit(tx, operation).await?;

        tracing::info!(server_id = id, active, "Server {operation}d");
        Ok(server)
    }

    async fn begin(&self) -> CoreResult<S::Tx> {
        self.store.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to begin unit of work");
            CoreError::Persistence(e)
        })
    }
}

// ---------------------------------------------------------------------------
// Unit-of-work helpers
// ---------------------------------------------------------------------------

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: SERVER_ENTITY,
        id,
    }
}

/// Existence check inside an open unit of work.
async fn load<T: ServerTx>(tx: &mut T, id: DbId) -> CoreResult<ServerRecord> {
    match tx.find_by_id(id).await {
        Ok(Some(server)) => Ok(server),
        Ok(None) => Err(not_found(id)),
        Err(e) => {
            tracing::warn!(server_id = id, error = %e, "Server lookup failed");
            Err(not_found(id))
        }
    }
}

async fn commit<T: ServerTx>(tx: T, operation: &'static str) -> CoreResult<()> {
    tx.commit().await.map_err(|e| {
        tracing::error!(operation, error = %e, "Commit failed");
        CoreError::Persistence(e)
    })
}

/// Roll back after a failed storage call and convert the failure.
async fn abort<T: ServerTx>(tx: T, operation: &'static str, err: StoreError) -> CoreError {
    tracing::error!(operation, error = %err, "Storage operation failed, rolling back");
    rollback(tx, operation).await;
    CoreError::Persistence(err)
}

/// The row existed at the check but was gone by the write.
async fn vanished<T: ServerTx>(tx: T, operation: &'static str, id: DbId) -> CoreError {
    tracing::warn!(operation, server_id = id, "Server removed concurrently, rolling back");
    rollback(tx, operation).await;
    not_found(id)
}

async fn rollback<T: ServerTx>(tx: T, operation: &'static str) {
    if let Err(e) = tx.rollback().await {
        tracing::error!(operation, error = %e, "Rollback failed");
    }
}
