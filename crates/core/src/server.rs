//! Server record types and input validation.
//!
//! A server record tracks one host: its network address, its hostname
//! (shared by replicas, so not unique), and whether it is currently active.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Entity name used in [`CoreError::NotFound`].
pub const SERVER_ENTITY: &str = "Server";

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A persisted server record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: DbId,
    pub ip: String,
    pub hostname: String,
    pub active: bool,
}

impl ServerRecord {
    pub fn enable(&mut self) {
        self.active = true;
    }

    pub fn disable(&mut self) {
        self.active = false;
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Input for creating a new server. `active` defaults to `false`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewServer {
    pub ip: String,
    pub hostname: String,
    #[serde(default)]
    pub active: bool,
}

impl NewServer {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_required("ip", &self.ip)?;
        validate_required("hostname", &self.hostname)
    }
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Input for updating an existing server.
///
/// Supplied fields replace the stored values; omitted fields keep them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateServer {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub active: Option<bool>,
}

impl UpdateServer {
    /// Resolve this update against the currently stored record.
    pub fn apply_to(self, current: &ServerRecord) -> ServerFields {
        ServerFields {
            ip: self.ip.unwrap_or_else(|| current.ip.clone()),
            hostname: self.hostname.unwrap_or_else(|| current.hostname.clone()),
            active: self.active.unwrap_or(current.active),
        }
    }
}

/// The full set of mutable columns written by an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerFields {
    pub ip: String,
    pub hostname: String,
    pub active: bool,
}

impl ServerFields {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_required("ip", &self.ip)?;
        validate_required("hostname", &self.hostname)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_required(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
