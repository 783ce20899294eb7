//! Hostwatch core domain.
//!
//! Storage-agnostic building blocks of the host inventory:
//!
//! - [`store`]: the storage port (`ServerStore` / `ServerTx`) every
//!   persistence backend implements.
//! - [`registry::ServerRegistry`]: transactional CRUD, enable/disable, and
//!   the hostname aggregation query.
//! - [`scheduler::Scheduler`]: lifecycle of the recurring active-host
//!   sampling job.

pub mod error;
pub mod registry;
pub mod scheduler;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;
