//! Handlers for the `/committees` resource.
//!
//! Committees are displayed in a user-controlled order. Updates can move a
//! committee to another position (swapping with the current holder), so
//! update and reorder responses carry the whole ordered list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use summit_core::error::CoreError;
use summit_core::ordering::{validate_reorder, Slot};
use summit_core::types::DbId;
use summit_db::models::committee::{CreateCommittee, UpdateCommittee};
use summit_db::repositories::CommitteeRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::images;
use crate::middleware::auth::RequireAdmin;
use crate::response::{DataResponse, UpdateResponse};
use crate::state::AppState;

const ENTITY: &str = "Committee";

/// Prefix for generated image object names.
const IMAGE_RESOURCE: &str = "committee";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// GET /api/v1/committees
pub async fn list_committees(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let committees = CommitteeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: committees }))
}

/// GET /api/v1/committees/{id}
pub async fn get_committee(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let committee = CommitteeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: committee }))
}

/// POST /api/v1/committees
///
/// Appends to the end of the list unless a position is given. An `image`
/// may be a data URL (uploaded) or an absolute URL (stored as is).
pub async fn create_committee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCommittee>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let storage = state.storage.as_ref();
    let image = images::ingest_new(storage, IMAGE_RESOURCE, input.image.as_deref()).await?;

    let committee = match CommitteeRepo::create(&state.pool, &input, image.url()).await {
        Ok(c) => c,
        Err(e) => {
            image.discard(storage).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        committee_id = committee.id,
        name = %committee.name,
        position = committee.position,
        admin = %admin.email,
        "Committee created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: committee })))
}

/// PUT /api/v1/committees/{id}
///
/// Writes only changed fields. A new `position` swaps with the committee
/// currently holding it. Responds with the full ordered list.
pub async fn update_committee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCommittee>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = CommitteeRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let storage = state.storage.as_ref();
    let image = images::ingest_patch(
        storage,
        IMAGE_RESOURCE,
        &input.image,
        current.image_url.as_deref(),
    )
    .await?;

    let changes = input.changes(&current, &image.url);
    let position = input.position_change(&current);

    if changes.is_empty() && position.is_none() {
        tracing::debug!(committee_id = id, "Committee update had no changes");
        let committees = CommitteeRepo::list(&state.pool).await?;
        return Ok(Json(UpdateResponse::unchanged(committees)));
    }

    let result = CommitteeRepo::update(&state.pool, id, &changes, position).await;
    let updated = image.settle(storage, result).await?.ok_or_else(|| not_found(id))?;

    if changes.get("image_url").is_some() {
        images::retire_replaced(
            storage,
            &state.pool,
            current.image_url.as_deref(),
            updated.image_url.as_deref(),
        )
        .await;
    }

    tracing::info!(
        committee_id = id,
        fields = ?changes.fields(),
        position = ?position,
        admin = %admin.email,
        "Committee updated",
    );

    let committees = CommitteeRepo::list(&state.pool).await?;
    Ok(Json(UpdateResponse::updated(committees)))
}

/// PUT /api/v1/committees/positions
///
/// Assign positions to several committees at once. Committees not named
/// keep their position; a collision with one of them is a 409.
pub async fn reorder_committees(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(entries): Json<Vec<Slot>>,
) -> AppResult<impl IntoResponse> {
    validate_reorder(&entries)?;
    CommitteeRepo::reorder(&state.pool, &entries).await?;

    tracing::info!(count = entries.len(), admin = %admin.email, "Committees reordered");

    let committees = CommitteeRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: committees }))
}

/// DELETE /api/v1/committees/{id}
///
/// The committee's image is removed from the bucket on a best-effort basis.
pub async fn delete_committee(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = CommitteeRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    images::remove_for_deleted(
        state.storage.as_ref(),
        &state.pool,
        deleted.image_url.as_deref(),
    )
    .await;

    tracing::info!(committee_id = id, admin = %admin.email, "Committee deleted");

    Ok(StatusCode::NO_CONTENT)
}
