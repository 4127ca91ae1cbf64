//! Handlers for the `/schools` resource (delegation registrations).
//!
//! Registration is public and rate limited; everything else is admin only.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use summit_core::error::CoreError;
use summit_core::types::DbId;
use summit_db::models::school::{CreateSchool, School, UpdateSchool};
use summit_db::repositories::SchoolRepo;

use crate::email::Mailer;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::middleware::rate_limit::RateLimit;
use crate::response::{DataResponse, UpdateResponse};
use crate::state::AppState;

const ENTITY: &str = "School";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: ENTITY, id })
}

/// Registration list plus the delegate head count.
#[derive(Debug, Serialize)]
pub struct SchoolList {
    pub schools: Vec<School>,
    pub total_delegates: i64,
}

/// Send the confirmation email in the background. Failure is logged only.
fn spawn_confirmation(mailer: Arc<Mailer>, school: School) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send_registration_confirmation(&school).await {
            tracing::warn!(school_id = school.id, error = %e, "Failed to send registration confirmation");
        }
    });
}

/// POST /api/v1/schools
///
/// Public registration. A school name and advisor email pair registers once;
/// a repeat registration is a 409.
pub async fn register_school(
    _limit: RateLimit,
    State(state): State<AppState>,
    Json(input): Json<CreateSchool>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let school = SchoolRepo::create(&state.pool, &input).await?;

    tracing::info!(
        school_id = school.id,
        school_name = %school.school_name,
        delegates = school.delegate_count,
        "School registered",
    );

    if let Some(mailer) = &state.mailer {
        spawn_confirmation(Arc::clone(mailer), school.clone());
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: school })))
}

/// GET /api/v1/schools
pub async fn list_schools(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let schools = SchoolRepo::list(&state.pool).await?;
    let total_delegates = SchoolRepo::total_delegates(&state.pool).await?;
    Ok(Json(DataResponse {
        data: SchoolList {
            schools,
            total_delegates,
        },
    }))
}

/// GET /api/v1/schools/{id}
pub async fn get_school(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let school = SchoolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: school }))
}

/// PUT /api/v1/schools/{id}
pub async fn update_school(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSchool>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let current = SchoolRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let changes = input.changes(&current);
    if changes.is_empty() {
        return Ok(Json(UpdateResponse::unchanged(current)));
    }

    let updated = SchoolRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(school_id = id, fields = ?changes.fields(), admin = %admin.email, "School updated");

    Ok(Json(UpdateResponse::updated(updated)))
}

/// DELETE /api/v1/schools/{id}
pub async fn delete_school(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !SchoolRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }

    tracing::info!(school_id = id, admin = %admin.email, "School registration deleted");

    Ok(StatusCode::NO_CONTENT)
}
