//! In-memory storage port used by the core's unit tests.
//!
//! Each unit of work reads from a private copy of the table taken at
//! `begin` and buffers its writes; `commit` replays them onto the shared
//! table. Dropping a unit of work discards the buffer. Ids come from a shared
//! counter that is not rolled back, like a database sequence.
//!
//! Faults can be switched on per category to exercise failure paths, and
//! `active_ips` can be held open to observe a query that is still in flight.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::server::{NewServer, ServerFields, ServerRecord};
use crate::store::{ServerStore, ServerTx, StoreError, StoreResult};
use crate::types::DbId;

#[derive(Default)]
struct Table {
    last_id: DbId,
    rows: BTreeMap<DbId, ServerRecord>,
}

#[derive(Default)]
struct Faults {
    begin: AtomicBool,
    reads: AtomicBool,
    writes: AtomicBool,
    commit: AtomicBool,
}

#[derive(Default)]
struct Counters {
    begins: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
    writes: AtomicUsize,
}

/// Holds `active_ips` calls until released.
#[derive(Default)]
struct ReadGate {
    held: AtomicBool,
    entered: Notify,
    release: Notify,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    table: Arc<Mutex<Table>>,
    faults: Arc<Faults>,
    counters: Arc<Counters>,
    gate: Arc<ReadGate>,
}

impl InMemoryStore {
    /// Insert records with fixed ids, bypassing units of work.
    pub fn seed(&self, records: impl IntoIterator<Item = ServerRecord>) {
        let mut table = self.table.lock().unwrap();
        for record in records {
            table.last_id = table.last_id.max(record.id);
            table.rows.insert(record.id, record);
        }
    }

    /// Committed rows in id order.
    pub fn snapshot(&self) -> Vec<ServerRecord> {
        self.table.lock().unwrap().rows.values().cloned().collect()
    }

    pub fn fail_begin(&self, on: bool) {
        self.faults.begin.store(on, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, on: bool) {
        self.faults.reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.faults.writes.store(on, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, on: bool) {
        self.faults.commit.store(on, Ordering::SeqCst);
    }

    /// Make every later `active_ips` call wait for [`Self::release_active_ips`].
    pub fn hold_active_ips(&self) {
        self.gate.held.store(true, Ordering::SeqCst);
    }

    /// Resolves once a held `active_ips` call is waiting.
    pub async fn active_ips_entered(&self) {
        self.gate.entered.notified().await;
    }

    /// Let one held `active_ips` call finish and stop holding new ones.
    pub fn release_active_ips(&self) {
        self.gate.held.store(false, Ordering::SeqCst);
        self.gate.release.notify_one();
    }

    pub fn begins(&self) -> usize {
        self.counters.begins.load(Ordering::SeqCst)
    }

    pub fn commits(&self) -> usize {
        self.counters.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> usize {
        self.counters.rollbacks.load(Ordering::SeqCst)
    }

    /// Write calls that reached the store, successful or not.
    pub fn writes(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServerStore for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> StoreResult<InMemoryTx> {
        if self.faults.begin.load(Ordering::SeqCst) {
            return Err(StoreError::new("injected begin failure"));
        }
        self.counters.begins.fetch_add(1, Ordering::SeqCst);
        let view = self.table.lock().unwrap().rows.clone();
        Ok(InMemoryTx {
            store: self.clone(),
            view,
            log: Vec::new(),
            finished: false,
        })
    }
}

enum Write {
    Put(ServerRecord),
    Remove(DbId),
}

pub struct InMemoryTx {
    store: InMemoryStore,
    view: BTreeMap<DbId, ServerRecord>,
    log: Vec<Write>,
    finished: bool,
}

impl InMemoryTx {
    fn check_read(&self) -> StoreResult<()> {
        if self.store.faults.reads.load(Ordering::SeqCst) {
            return Err(StoreError::new("injected read failure"));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        self.store.counters.writes.fetch_add(1, Ordering::SeqCst);
        if self.store.faults.writes.load(Ordering::SeqCst) {
            return Err(StoreError::new("injected write failure"));
        }
        Ok(())
    }

    fn put(&mut self, record: ServerRecord) {
        self.view.insert(record.id, record.clone());
        self.log.push(Write::Put(record));
    }

    fn finish_rolled_back(&mut self) {
        self.finished = true;
        self.log.clear();
        self.store.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for InMemoryTx {
    fn drop(&mut self) {
        if !self.finished {
            self.finish_rolled_back();
        }
    }
}

#[async_trait]
impl ServerTx for InMemoryTx {
    async fn commit(self) -> StoreResult<()> {
        let mut tx = self;
        if tx.store.faults.commit.load(Ordering::SeqCst) {
            tx.finish_rolled_back();
            return Err(StoreError::new("injected commit failure"));
        }

        let mut table = tx.store.table.lock().unwrap();
        for write in tx.log.drain(..) {
            match write {
                Write::Put(record) => {
                    table.rows.insert(record.id, record);
                }
                Write::Remove(id) => {
                    table.rows.remove(&id);
                }
            }
        }
        drop(table);

        tx.finished = true;
        tx.store.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self) -> StoreResult<()> {
        let mut tx = self;
        tx.finish_rolled_back();
        Ok(())
    }

    async fn find_by_id(&mut self, id: DbId) -> StoreResult<Option<ServerRecord>> {
        self.check_read()?;
        Ok(self.view.get(&id).cloned())
    }

    async fn insert(&mut self, input: &NewServer) -> StoreResult<ServerRecord> {
        self.check_write()?;
        let id = {
            let mut table = self.store.table.lock().unwrap();
            table.last_id += 1;
            table.last_id
        };
        let record = ServerRecord {
            id,
            ip: input.ip.clone(),
            hostname: input.hostname.clone(),
            active: input.active,
        };
        self.put(record.clone());
        Ok(record)
    }

    async fn update(
        &mut self,
        id: DbId,
        fields: &ServerFields,
    ) -> StoreResult<Option<ServerRecord>> {
        self.check_write()?;
        let Some(existing) = self.view.get(&id) else {
            return Ok(None);
        };
        let record = ServerRecord {
            id: existing.id,
            ip: fields.ip.clone(),
            hostname: fields.hostname.clone(),
            active: fields.active,
        };
        self.put(record.clone());
        Ok(Some(record))
    }

    async fn set_active(&mut self, id: DbId, active: bool) -> StoreResult<Option<ServerRecord>> {
        self.check_write()?;
        let Some(existing) = self.view.get(&id) else {
            return Ok(None);
        };
        let record = ServerRecord {
            active,
            ..existing.clone()
        };
        self.put(record.clone());
        Ok(Some(record))
    }

    async fn delete(&mut self, id: DbId) -> StoreResult<u64> {
        self.check_write()?;
        if self.view.remove(&id).is_none() {
            return Ok(0);
        }
        self.log.push(Write::Remove(id));
        Ok(1)
    }

    async fn list(&mut self) -> StoreResult<Vec<ServerRecord>> {
        self.check_read()?;
        Ok(self.view.values().cloned().collect())
    }

    async fn hostnames_at_or_below(&mut self, threshold: i64) -> StoreResult<Vec<String>> {
        self.check_read()?;
        let mut active_counts: BTreeMap<&str, i64> = BTreeMap::new();
        for record in self.view.values() {
            *active_counts.entry(record.hostname.as_str()).or_default() += i64::from(record.active);
        }
        Ok(active_counts
            .into_iter()
            .filter(|(_, count)| *count <= threshold)
            .map(|(hostname, _)| hostname.to_string())
            .collect())
    }

    async fn active_ips(&mut self) -> StoreResult<Vec<String>> {
        self.check_read()?;
        if self.store.gate.held.load(Ordering::SeqCst) {
            self.store.gate.entered.notify_one();
            self.store.gate.release.notified().await;
        }
        Ok(self
            .view
            .values()
            .filter(|record| record.active)
            .map(|record| record.ip.clone())
            .collect())
    }
}
