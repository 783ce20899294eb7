use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
    /// Whether the sampling job is active.
    pub scheduler_running: bool,
}

/// GET /health -- returns service, database and scheduler health.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = hostwatch_db::health_check(&state.pool).await.is_ok();
    let scheduler_running = state.scheduler.is_running().await;

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        scheduler_running,
    })
}

/// Mount health check routes (root-level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
