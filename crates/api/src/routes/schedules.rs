//! Route definitions for the `/schedules` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::schedules;
use crate::state::AppState;

/// Routes mounted at `/schedules`.
///
/// ```text
/// GET    /      -> list_schedules (?day=YYYY-MM-DD)
/// POST   /      -> create_schedule (admin)
/// GET    /{id}  -> get_schedule
/// PUT    /{id}  -> update_schedule (admin)
/// DELETE /{id}  -> delete_schedule (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/{id}",
            get(schedules::get_schedule)
                .put(schedules::update_schedule)
                .delete(schedules::delete_schedule),
        )
}
