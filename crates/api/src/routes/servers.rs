//! Route definitions for server records, mounted at `/servers`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::servers;
use crate::state::AppState;

/// ```text
/// GET    /                       -> list_servers
/// POST   /                       -> create_server
/// GET    /hostnames              -> hostnames_below_default_threshold
/// GET    /hostnames/{threshold}  -> hostnames_below_threshold
/// GET    /{id}                   -> get_server
/// PUT    /{id}                   -> update_server
/// DELETE /{id}                   -> delete_server
/// PUT    /{id}/enable            -> enable_server
/// PUT    /{id}/disable           -> disable_server
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(servers::list_servers).post(servers::create_server),
        )
        .route(
            "/hostnames",
            get(servers::hostnames_below_default_threshold),
        )
        .route(
            "/hostnames/{threshold}",
            get(servers::hostnames_below_threshold),
        )
        .route(
            "/{id}",
            get(servers::get_server)
                .put(servers::update_server)
                .delete(servers::delete_server),
        )
        .route("/{id}/enable", put(servers::enable_server))
        .route("/{id}/disable", put(servers::disable_server))
}
