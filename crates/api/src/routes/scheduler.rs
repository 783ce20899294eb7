//! Route definitions for the sampling scheduler, mounted at `/scheduler`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scheduler;
use crate::state::AppState;

/// ```text
/// GET    /        -> scheduler_status
/// POST   /start   -> start_scheduler
/// POST   /stop    -> stop_scheduler
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scheduler::scheduler_status))
        .route("/start", post(scheduler::start_scheduler))
        .route("/stop", post(scheduler::stop_scheduler))
}
