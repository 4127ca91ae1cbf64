//! Route definitions for the `/committees` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::committees;
use crate::state::AppState;

/// Routes mounted at `/committees`.
///
/// ```text
/// GET    /           -> list_committees
/// POST   /           -> create_committee (admin)
/// PUT    /positions  -> reorder_committees (admin)
/// GET    /{id}       -> get_committee
/// PUT    /{id}       -> update_committee (admin)
/// DELETE /{id}       -> delete_committee (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(committees::list_committees).post(committees::create_committee),
        )
        .route("/positions", put(committees::reorder_committees))
        .route(
            "/{id}",
            get(committees::get_committee)
                .put(committees::update_committee)
                .delete(committees::delete_committee),
        )
}
