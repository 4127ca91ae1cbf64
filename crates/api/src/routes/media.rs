//! Route definitions for the `/media` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::media;
use crate::state::AppState;

/// Routes mounted at `/media`.
///
/// ```text
/// GET /  -> list_media (admin, ?prefix=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(media::list_media))
}
