//! Handlers for the `/hotels` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use summit_core::error::CoreError;
use summit_core::types::DbId;
use summit_db::models::hotel::{CreateHotel, UpdateHotel};
use summit_db::repositories::HotelRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::images;
use crate::middleware::auth::RequireAdmin;
use crate::response::{DataResponse, UpdateResponse};
use crate::state::AppState;

const ENTITY: &str = "Hotel";
const IMAGE_RESOURCE: &str = "hotel";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// GET /api/v1/hotels
pub async fn list_hotels(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let hotels = HotelRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: hotels }))
}

/// GET /api/v1/hotels/{id}
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let hotel = HotelRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: hotel }))
}

/// POST /api/v1/hotels
pub async fn create_hotel(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateHotel>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let storage = state.storage.as_ref();
    let image = images::ingest_new(storage, IMAGE_RESOURCE, input.image.as_deref()).await?;

    let hotel = match HotelRepo::create(&state.pool, &input, image.url()).await {
        Ok(h) => h,
        Err(e) => {
            image.discard(storage).await;
            return Err(e.into());
        }
    };

    tracing::info!(hotel_id = hotel.id, name = %hotel.name, admin = %admin.email, "Hotel created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: hotel })))
}

/// PUT /api/v1/hotels/{id}
///
/// Writes only changed fields. Responds with the stored hotel and whether
/// anything was written.
pub async fn update_hotel(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHotel>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = HotelRepo::find_by_id(&state.pool, id)
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
    if changes.is_empty() {
        tracing::debug!(hotel_id = id, "Hotel update had no changes");
        return Ok(Json(UpdateResponse::unchanged(current)));
    }

    let result = HotelRepo::update(&state.pool, id, &changes).await;
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
        hotel_id = id,
        fields = ?changes.fields(),
        admin = %admin.email,
        "Hotel updated",
    );

    Ok(Json(UpdateResponse::updated(updated)))
}

/// DELETE /api/v1/hotels/{id}
pub async fn delete_hotel(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = HotelRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    images::remove_for_deleted(
        state.storage.as_ref(),
        &state.pool,
        deleted.image_url.as_deref(),
    )
    .await;

    tracing::info!(hotel_id = id, admin = %admin.email, "Hotel deleted");

    Ok(StatusCode::NO_CONTENT)
}
