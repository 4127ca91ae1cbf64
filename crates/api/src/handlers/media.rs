//! Handlers for browsing the image bucket.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /media`.
#[derive(Debug, Default, Deserialize)]
pub struct MediaListParams {
    /// Only list objects whose name starts with this prefix.
    #[serde(default)]
    pub prefix: String,
}

/// GET /api/v1/media
pub async fn list_media(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<MediaListParams>,
) -> AppResult<impl IntoResponse> {
    let objects = state
        .storage
        .list(params.prefix.trim())
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to list storage objects: {e}")))?;

    Ok(Json(DataResponse { data: objects }))
}
