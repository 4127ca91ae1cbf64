//! Handlers for the `/secretariates` resource (conference staff).
//!
//! Same ordering rules as committees: updates may swap positions, so
//! update and reorder respond with the full ordered list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use summit_core::error::CoreError;
use summit_core::ordering::{validate_reorder, Slot};
use summit_core::types::DbId;
use summit_db::models::secretariate::{CreateSecretariate, UpdateSecretariate};
use summit_db::repositories::SecretariateRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::images;
use crate::middleware::auth::RequireAdmin;
use crate::response::{DataResponse, UpdateResponse};
use crate::state::AppState;

const ENTITY: &str = "Secretariate";
const IMAGE_RESOURCE: &str = "secretariate";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// GET /api/v1/secretariates
pub async fn list_secretariates(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let members = SecretariateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: members }))
}

/// GET /api/v1/secretariates/{id}
pub async fn get_secretariate(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let member = SecretariateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// POST /api/v1/secretariates
pub async fn create_secretariate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSecretariate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let storage = state.storage.as_ref();
    let photo = images::ingest_new(storage, IMAGE_RESOURCE, input.photo.as_deref()).await?;

    let member = match SecretariateRepo::create(&state.pool, &input, photo.url()).await {
        Ok(m) => m,
        Err(e) => {
            photo.discard(storage).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        secretariate_id = member.id,
        name = %member.name,
        position = member.position,
        admin = %admin.email,
        "Secretariate member created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// PUT /api/v1/secretariates/{id}
pub async fn update_secretariate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSecretariate>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = SecretariateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let storage = state.storage.as_ref();
    let photo = images::ingest_patch(
        storage,
        IMAGE_RESOURCE,
        &input.photo,
        current.photo_url.as_deref(),
    )
    .await?;

    let changes = input.changes(&current, &photo.url);
    let position = input.position_change(&current);

    if changes.is_empty() && position.is_none() {
        tracing::debug!(secretariate_id = id, "Secretariate update had no changes");
        let members = SecretariateRepo::list(&state.pool).await?;
        return Ok(Json(UpdateResponse::unchanged(members)));
    }

    let result = SecretariateRepo::update(&state.pool, id, &changes, position).await;
    let updated = photo.settle(storage, result).await?.ok_or_else(|| not_found(id))?;

    if changes.get("photo_url").is_some() {
        images::retire_replaced(
            storage,
            &state.pool,
            current.photo_url.as_deref(),
            updated.photo_url.as_deref(),
        )
        .await;
    }

    tracing::info!(
        secretariate_id = id,
        fields = ?changes.fields(),
        position = ?position,
        admin = %admin.email,
        "Secretariate member updated",
    );

    let members = SecretariateRepo::list(&state.pool).await?;
    Ok(Json(UpdateResponse::updated(members)))
}

/// PUT /api/v1/secretariates/positions
pub async fn reorder_secretariates(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(entries): Json<Vec<Slot>>,
) -> AppResult<impl IntoResponse> {
    validate_reorder(&entries)?;
    SecretariateRepo::reorder(&state.pool, &entries).await?;

    tracing::info!(count = entries.len(), admin = %admin.email, "Secretariates reordered");

    let members = SecretariateRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: members }))
}

/// DELETE /api/v1/secretariates/{id}
pub async fn delete_secretariate(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = SecretariateRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    images::remove_for_deleted(
        state.storage.as_ref(),
        &state.pool,
        deleted.photo_url.as_deref(),
    )
    .await;

    tracing::info!(secretariate_id = id, admin = %admin.email, "Secretariate member deleted");

    Ok(StatusCode::NO_CONTENT)
}
