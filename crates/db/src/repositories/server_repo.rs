//! Repository for the `servers` table.
//!
//! Every function takes a `&mut PgConnection` so callers decide the
//! transaction boundary (pass `&mut *tx` inside a transaction).

use hostwatch_core::server::{NewServer, ServerFields};
use hostwatch_core::types::DbId;
use sqlx::PgConnection;

use crate::models::server::ServerRow;

/// Column list for servers queries.
const COLUMNS: &str = "id, ip, hostname, active";

/// Provides CRUD and aggregate queries for server records.
pub struct ServerRepo;

impl ServerRepo {
    /// Insert a new server, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewServer,
    ) -> Result<ServerRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO servers (ip, hostname, active)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServerRow>(&query)
            .bind(&input.ip)
            .bind(&input.hostname)
            .bind(input.active)
            .fetch_one(conn)
            .await
    }

    /// Find a server by its primary key.
    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ServerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM servers WHERE id = $1");
        sqlx::query_as::<_, ServerRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List all servers in insertion order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<ServerRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM servers ORDER BY id ASC");
        sqlx::query_as::<_, ServerRow>(&query).fetch_all(conn).await
    }

    /// Overwrite all mutable columns. Returns the updated row, or `None` if
    /// not found.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        fields: &ServerFields,
    ) -> Result<Option<ServerRow>, sqlx::Error> {
        let query = format!(
            "UPDATE servers SET ip = $1, hostname = $2, active = $3
             WHERE id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServerRow>(&query)
            .bind(&fields.ip)
            .bind(&fields.hostname)
            .bind(fields.active)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Update only the `active` flag.
    pub async fn set_active(
        conn: &mut PgConnection,
        id: DbId,
        active: bool,
    ) -> Result<Option<ServerRow>, sqlx::Error> {
        let query = format!(
            "UPDATE servers SET active = $1
             WHERE id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServerRow>(&query)
            .bind(active)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Hard-delete a server. Returns the number of rows removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM servers WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Hostnames whose number of active rows is at most `threshold`.
    pub async fn hostnames_at_or_below(
        conn: &mut PgConnection,
        threshold: i64,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT hostname FROM servers
             GROUP BY hostname
             HAVING COUNT(*) FILTER (WHERE active) <= $1
             ORDER BY hostname ASC",
        )
        .bind(threshold)
        .fetch_all(conn)
        .await
    }

    /// IP addresses of all active servers.
    pub async fn active_ips(conn: &mut PgConnection) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT ip FROM servers WHERE active ORDER BY id ASC")
            .fetch_all(conn)
            .await
    }
}
