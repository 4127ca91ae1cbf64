//! Handlers for the `/quotes` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use summit_core::error::CoreError;
use summit_core::types::DbId;
use summit_db::models::quote::{CreateQuote, UpdateQuote};
use summit_db::repositories::QuoteRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::{DataResponse, UpdateResponse};
use crate::state::AppState;

const ENTITY: &str = "Quote";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// GET /api/v1/quotes
pub async fn list_quotes(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let quotes = QuoteRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: quotes }))
}

/// GET /api/v1/quotes/{id}
pub async fn get_quote(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let quote = QuoteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: quote }))
}

/// POST /api/v1/quotes
pub async fn create_quote(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateQuote>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let quote = QuoteRepo::create(&state.pool, &input).await?;

    tracing::info!(quote_id = quote.id, admin = %admin.email, "Quote created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: quote })))
}

/// PUT /api/v1/quotes/{id}
pub async fn update_quote(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateQuote>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = QuoteRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let changes = input.changes(&current);
    if changes.is_empty() {
        return Ok(Json(UpdateResponse::unchanged(current)));
    }

    let updated = QuoteRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(quote_id = id, fields = ?changes.fields(), admin = %admin.email, "Quote updated");

    Ok(Json(UpdateResponse::updated(updated)))
}

/// DELETE /api/v1/quotes/{id}
pub async fn delete_quote(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !QuoteRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(quote_id = id, admin = %admin.email, "Quote deleted");

    Ok(StatusCode::NO_CONTENT)
}
