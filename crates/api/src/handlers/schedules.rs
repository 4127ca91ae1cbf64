//! Handlers for the `/schedules` resource (conference programme).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use summit_core::error::CoreError;
use summit_core::types::DbId;
use summit_db::models::schedule::{CreateScheduleEntry, UpdateScheduleEntry};
use summit_db::repositories::ScheduleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::response::{DataResponse, UpdateResponse};
use crate::state::AppState;

const ENTITY: &str = "ScheduleEntry";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// Query parameters for `GET /schedules`.
#[derive(Debug, Deserialize)]
pub struct ScheduleListParams {
    /// Restrict to a single day (`YYYY-MM-DD`).
    pub day: Option<NaiveDate>,
}

/// GET /api/v1/schedules
///
/// Entries ordered by day, then start time.
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(params): Query<ScheduleListParams>,
) -> AppResult<impl IntoResponse> {
    let entries = ScheduleRepo::list(&state.pool, params.day).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/schedules/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: entry }))
}

/// POST /api/v1/schedules
pub async fn create_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateScheduleEntry>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let entry = ScheduleRepo::create(&state.pool, &input).await?;

    tracing::info!(
        schedule_id = entry.id,
        day = %entry.day,
        title = %entry.title,
        admin = %admin.email,
        "Schedule entry created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// PUT /api/v1/schedules/{id}
///
/// The resulting time range is checked against the stored entry before
/// anything is written.
pub async fn update_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateScheduleEntry>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = ScheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    input.validate_against(&current)?;

    let changes = input.changes(&current);
    if changes.is_empty() {
        return Ok(Json(UpdateResponse::unchanged(current)));
    }

    let updated = ScheduleRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(
        schedule_id = id,
        fields = ?changes.fields(),
        admin = %admin.email,
        "Schedule entry updated",
    );

    Ok(Json(UpdateResponse::updated(updated)))
}

/// DELETE /api/v1/schedules/{id}
pub async fn delete_schedule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ScheduleRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(schedule_id = id, admin = %admin.email, "Schedule entry deleted");

    Ok(StatusCode::NO_CONTENT)
}
