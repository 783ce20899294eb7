//! Handlers for the active-host sampling scheduler.
//!
//! Starting a running scheduler or stopping an idle one is not an error:
//! both answer 200 with an outcome that says nothing changed.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use hostwatch_core::scheduler::SchedulerOutcome;
use serde::Serialize;

use crate::response::DataResponse;
use crate::state::AppState;

/// Body returned by start and stop.
#[derive(Debug, Serialize)]
pub struct SchedulerCommandResponse {
    pub outcome: SchedulerOutcome,
    pub message: &'static str,
    /// Whether this request changed the scheduler state.
    pub changed: bool,
    /// Scheduler state observed after the command.
    pub running: bool,
}

impl SchedulerCommandResponse {
    async fn observe(state: &AppState, outcome: SchedulerOutcome) -> Self {
        Self {
            outcome,
            message: outcome.message(),
            changed: outcome.changed_state(),
            running: state.scheduler.is_running().await,
        }
    }
}

/// POST /api/v1/scheduler/start
pub async fn start_scheduler(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.scheduler.start().await;
    tracing::info!(outcome = ?outcome, "Scheduler start requested");
    Json(DataResponse {
        data: SchedulerCommandResponse::observe(&state, outcome).await,
    })
}

/// POST /api/v1/scheduler/stop
pub async fn stop_scheduler(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.scheduler.stop().await;
    tracing::info!(outcome = ?outcome, "Scheduler stop requested");
    Json(DataResponse {
        data: SchedulerCommandResponse::observe(&state, outcome).await,
    })
}

/// GET /api/v1/scheduler
pub async fn scheduler_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.scheduler.status().await;
    Json(DataResponse { data: status })
}
