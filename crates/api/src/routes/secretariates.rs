//! Route definitions for the `/secretariates` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::secretariates;
use crate::state::AppState;

/// Routes mounted at `/secretariates`.
///
/// ```text
/// GET    /           -> list_secretariates
/// POST   /           -> create_secretariate (admin)
/// PUT    /positions  -> reorder_secretariates (admin)
/// GET    /{id}       -> get_secretariate
/// PUT    /{id}       -> update_secretariate (admin)
/// DELETE /{id}       -> delete_secretariate (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(secretariates::list_secretariates).post(secretariates::create_secretariate),
        )
        .route("/positions", put(secretariates::reorder_secretariates))
        .route(
            "/{id}",
            get(secretariates::get_secretariate)
                .put(secretariates::update_secretariate)
                .delete(secretariates::delete_secretariate),
        )
}
