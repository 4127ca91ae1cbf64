//! Route definitions for the `/hotels` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::hotels;
use crate::state::AppState;

/// Routes mounted at `/hotels`.
///
/// ```text
/// GET    /      -> list_hotels
/// POST   /      -> create_hotel (admin)
/// GET    /{id}  -> get_hotel
/// PUT    /{id}  -> update_hotel (admin)
/// DELETE /{id}  -> delete_hotel (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(hotels::list_hotels).post(hotels::create_hotel))
        .route(
            "/{id}",
            get(hotels::get_hotel)
                .put(hotels::update_hotel)
                .delete(hotels::delete_hotel),
        )
}
