//! Handlers for server records and the hostname threshold query.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use hostwatch_core::server::{NewServer, UpdateServer};
use hostwatch_core::types::DbId;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// GET /api/v1/servers
pub async fn list_servers(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let servers = state.registry.list().await?;
    Ok(Json(DataResponse { data: servers }))
}

/// GET /api/v1/servers/{id}
pub async fn get_server(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let server = state.registry.get(id).await?;
    Ok(Json(DataResponse { data: server }))
}

/// POST /api/v1/servers
///
/// Returns 201 with the stored record, including its assigned id.
pub async fn create_server(
    State(state): State<AppState>,
    payload: Result<Json<NewServer>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let server = state.registry.create(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: server })))
}

/// PUT /api/v1/servers/{id}
///
/// Supplied fields replace the stored ones; omitted fields are kept.
pub async fn update_server(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    payload: Result<Json<UpdateServer>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let server = state.registry.update(id, input).await?;
    Ok(Json(DataResponse { data: server }))
}

/// PUT /api/v1/servers/{id}/enable
pub async fn enable_server(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let server = state.registry.enable(id).await?;
    Ok(Json(DataResponse { data: server }))
}

/// PUT /api/v1/servers/{id}/disable
pub async fn disable_server(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let server = state.registry.disable(id).await?;
    Ok(Json(DataResponse { data: server }))
}

/// DELETE /api/v1/servers/{id}
pub async fn delete_server(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.registry.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Hostname aggregation
// ---------------------------------------------------------------------------

/// GET /api/v1/servers/hostnames/{threshold}
///
/// An unparsable or negative threshold is replaced by the configured default.
pub async fn hostnames_below_threshold(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> AppResult<impl IntoResponse> {
    let threshold = state.registry.resolve_threshold(&raw);
    let hostnames = state.registry.hostnames_below_threshold(threshold).await?;
    Ok(Json(DataResponse { data: hostnames }))
}

/// GET /api/v1/servers/hostnames
pub async fn hostnames_below_default_threshold(
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let threshold = state.registry.default_threshold();
    let hostnames = state.registry.hostnames_below_threshold(threshold).await?;
    Ok(Json(DataResponse { data: hostnames }))
}
