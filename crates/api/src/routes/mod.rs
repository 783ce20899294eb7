pub mod health;
pub mod scheduler;
pub mod servers;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /servers                                 list, create
/// /servers/hostnames                       hostnames at or below the default threshold
/// /servers/hostnames/{threshold}           hostnames at or below threshold
/// /servers/{id}                            get, update, delete
/// /servers/{id}/enable                     enable (PUT)
/// /servers/{id}/disable                    disable (PUT)
///
/// /scheduler                               status
/// /scheduler/start                         start sampling (POST)
/// /scheduler/stop                          stop sampling (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/servers", servers::router())
        .nest("/scheduler", scheduler::router())
}
