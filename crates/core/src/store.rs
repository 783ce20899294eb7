//! Storage port for server records.
//!
//! The registry and scheduler never talk to a database directly. They open a
//! unit of work with [`ServerStore::begin`] and issue every read and write
//! through the returned [`ServerTx`].
//!
//! A `ServerTx` is a scoped guard: dropping it without calling
//! [`ServerTx::commit`] must discard all of its writes. This is what makes
//! early returns and unwinding safe in the registry.

use async_trait::async_trait;

use crate::server::{NewServer, ServerFields, ServerRecord};
use crate::types::DbId;

/// An opaque failure reported by a storage backend.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct StoreError(Box<dyn std::error::Error + Send + Sync>);

impl StoreError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persistence backend able to open units of work over the servers table.
#[async_trait]
pub trait ServerStore: Send + Sync + 'static {
    type Tx: ServerTx;

    /// Begin a new unit of work.
    async fn begin(&self) -> StoreResult<Self::Tx>;
}

/// One open unit of work. Dropping it without committing rolls it back.
#[async_trait]
pub trait ServerTx: Send {
    async fn commit(self) -> StoreResult<()>;

    async fn rollback(self) -> StoreResult<()>;

    async fn find_by_id(&mut self, id: DbId) -> StoreResult<Option<ServerRecord>>;

    /// Insert a record, returning it with its storage-assigned id.
    async fn insert(&mut self, input: &NewServer) -> StoreResult<ServerRecord>;

    /// Overwrite `ip`, `hostname`, and `active`. Returns the row as written,
    /// or `None` if no row has this id.
    async fn update(
        &mut self,
        id: DbId,
        fields: &ServerFields,
    ) -> StoreResult<Option<ServerRecord>>;

    /// Write only the `active` column. Returns the row as written, or `None`
    /// if no row has this id.
    async fn set_active(&mut self, id: DbId, active: bool) -> StoreResult<Option<ServerRecord>>;

    /// Delete by id, returning the number of rows removed.
    async fn delete(&mut self, id: DbId) -> StoreResult<u64>;

    /// All records in ascending id order.
    async fn list(&mut self) -> StoreResult<Vec<ServerRecord>>;

    /// Hostnames whose count of active records is at most `threshold`,
    /// in ascending order.
    async fn hostnames_at_or_below(&mut self, threshold: i64) -> StoreResult<Vec<String>>;

    /// IP addresses of all active records in ascending id order.
    async fn active_ips(&mut self) -> StoreResult<Vec<String>>;
}
