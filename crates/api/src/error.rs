use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use summit_core::error::CoreError;
use summit_db::DbError;

/// Error type returned by every handler.
///
/// Renders as `{ "error": <message>, "code": <CODE> }`. Messages of 5xx
/// responses are replaced by a generic text; the cause is logged instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    /// The caller exceeded the quota of a rate-limited endpoint.
    #[error("Too many requests")]
    RateLimited,
}

pub type AppResult<T> = Result<T, AppError>;

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Sqlx(e) => AppError::Database(e),
            DbError::Core(e) => AppError::Core(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

struct Rendered {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rendered {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

fn render_core(err: &CoreError) -> Rendered {
    match err {
        CoreError::NotFound { entity, id } => Rendered::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            Rendered::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
        }
        CoreError::InvalidImageFormat(msg) => {
            Rendered::new(StatusCode::BAD_REQUEST, "INVALID_IMAGE_FORMAT", msg.as_str())
        }
        CoreError::StorageUploadFailed(msg) => {
            tracing::error!(error = %msg, "Image upload failed");
            Rendered::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_UPLOAD_FAILED",
                "Failed to upload image",
            )
        }
        CoreError::Conflict(msg) => Rendered::new(StatusCode::CONFLICT, "CONFLICT", msg.as_str()),
        CoreError::Unauthorized(msg) => {
            Rendered::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.as_str())
        }
        CoreError::Forbidden(msg) => Rendered::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.as_str()),
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            Rendered::internal()
        }
    }
}

/// Client-facing text for a violated `uq_*` constraint.
fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_schools_name_email" => {
            "This school is already registered with that advisor email".to_string()
        }
        c if c.ends_with("_position") => "That position is already taken".to_string(),
        c => format!("Duplicate value violates unique constraint: {c}"),
    }
}

/// Map a sqlx error onto the API taxonomy.
///
/// - `RowNotFound` is 404.
/// - 23505 on a `uq_*` constraint is 409.
/// - 23514 on a `ck_*` constraint is 400; handlers validate first, so this
///   only fires when a request races a concurrent edit.
/// - Everything else is a sanitized 500.
fn render_sqlx(err: &sqlx::Error) -> Rendered {
    if let sqlx::Error::RowNotFound = err {
        return Rendered::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found");
    }

    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint().unwrap_or_default();
        match db_err.code().as_deref() {
            Some("23505") if constraint.starts_with("uq_") => {
                return render_core(&CoreError::Conflict(conflict_message(constraint)));
            }
            Some("23514") if constraint.starts_with("ck_") => {
                return Rendered::new(
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    format!("Value violates check constraint: {constraint}"),
                );
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "Database error");
    Rendered::internal()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let rendered = match &self {
            AppError::Core(core) => render_core(core),
            AppError::Database(err) => render_sqlx(err),
            AppError::BadRequest(msg) => {
                Rendered::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.as_str())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                Rendered::internal()
            }
            AppError::RateLimited => Rendered::new(
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, please try again later",
            ),
        };

        let body = ErrorBody {
            error: rendered.message,
            code: rendered.code,
        };
        (rendered.status, axum::Json(body)).into_response()
    }
}
