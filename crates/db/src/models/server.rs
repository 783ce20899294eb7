//! Row type for the `servers` table.

use hostwatch_core::server::ServerRecord;
use hostwatch_core::types::DbId;
use sqlx::FromRow;

/// A row from the `servers` table.
#[derive(Debug, Clone, FromRow)]
pub struct ServerRow {
    pub id: DbId,
    pub ip: String,
    pub hostname: String,
    pub active: bool,
}

impl From<ServerRow> for ServerRecord {
    fn from(row: ServerRow) -> Self {
        ServerRecord {
            id: row.id,
            ip: row.ip,
            hostname: row.hostname,
            active: row.active,
        }
    }
}
