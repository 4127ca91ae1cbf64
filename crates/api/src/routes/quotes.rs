//! Route definitions for the `/quotes` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::quotes;
use crate::state::AppState;

/// Routes mounted at `/quotes`.
///
/// ```text
/// GET    /      -> list_quotes
/// POST   /      -> create_quote (admin)
/// GET    /{id}  -> get_quote
/// PUT    /{id}  -> update_quote (admin)
/// DELETE /{id}  -> delete_quote (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quotes::list_quotes).post(quotes::create_quote))
        .route(
            "/{id}",
            get(quotes::get_quote)
                .put(quotes::update_quote)
                .delete(quotes::delete_quote),
        )
}
