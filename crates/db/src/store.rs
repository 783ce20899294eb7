//! PostgreSQL implementation of the core storage port.
//!
//! A unit of work is a `sqlx::Transaction`; dropping it without committing
//! rolls it back on the connection.

use async_trait::async_trait;
use hostwatch_core::server::{NewServer, ServerFields, ServerRecord};
use hostwatch_core::store::{ServerStore, ServerTx, StoreError, StoreResult};
use hostwatch_core::types::DbId;
use sqlx::{Postgres, Transaction};

use crate::repositories::ServerRepo;
use crate::DbPool;

/// Storage port backed by a shared connection pool.
#[derive(Clone)]
pub struct PgServerStore {
    pool: DbPool,
}

impl PgServerStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServerStore for PgServerStore {
    type Tx = PgServerTx;

    async fn begin(&self) -> StoreResult<PgServerTx> {
        let tx = self.pool.begin().await.map_err(StoreError::new)?;
        Ok(PgServerTx { tx })
    }
}

/// One open database transaction.
pub struct PgServerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ServerTx for PgServerTx {
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(StoreError::new)
    }

    async fn rollback(self) -> StoreResult<()> {
        self.tx.rollback().await.map_err(StoreError::new)
    }

    async fn find_by_id(&mut self, id: DbId) -> StoreResult<Option<ServerRecord>> {
        let row = ServerRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(StoreError::new)?;
        Ok(row.map(Into::into))
    }

    async fn insert(&mut self, input: &NewServer) -> StoreResult<ServerRecord> {
        let row = ServerRepo::create(&mut self.tx, input)
            .await
            .map_err(StoreError::new)?;
        Ok(row.into())
    }

    async fn update(
        &mut self,
        id: DbId,
        fields: &ServerFields,
    ) -> StoreResult<Option<ServerRecord>> {
        let row = ServerRepo::update(&mut self.tx, id, fields)
            .await
            .map_err(StoreError::new)?;
        Ok(row.map(Into::into))
    }

    async fn set_active(&mut self, id: DbId, active: bool) -> StoreResult<Option<ServerRecord>> {
        let row = ServerRepo::set_active(&mut self.tx, id, active)
            .await
            .map_err(StoreError::new)?;
        Ok(row.map(Into::into))
    }

    async fn delete(&mut self, id: DbId) -> StoreResult<u64> {
        ServerRepo::delete(&mut self.tx, id)
            .await
            .map_err(StoreError::new)
    }

    async fn list(&mut self) -> StoreResult<Vec<ServerRecord>> {
        let rows = ServerRepo::list(&mut self.tx)
            .await
            .map_err(StoreError::new)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn hostnames_at_or_below(&mut self, threshold: i64) -> StoreResult<Vec<String>> {
        ServerRepo::hostnames_at_or_below(&mut self.tx, threshold)
            .await
            .map_err(StoreError::new)
    }

    async fn active_ips(&mut self) -> StoreResult<Vec<String>> {
        ServerRepo::active_ips(&mut self.tx)
            .await
            .map_err(StoreError::new)
    }
}
