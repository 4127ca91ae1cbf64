//! Route definitions for the `/schools` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::schools;
use crate::state::AppState;

/// Routes mounted at `/schools`.
///
/// ```text
/// GET    /      -> list_schools (admin)
/// POST   /      -> register_school (public, rate limited)
/// GET    /{id}  -> get_school (admin)
/// PUT    /{id}  -> update_school (admin)
/// DELETE /{id}  -> delete_school (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(schools::list_schools).post(schools::register_school))
        .route(
            "/{id}",
            get(schools::get_school)
                .put(schools::update_school)
                .delete(schools::delete_school),
        )
}
