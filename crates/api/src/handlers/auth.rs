//! Handlers for the `/auth` resource (admin login and identity).

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use summit_core::error::CoreError;
use summit_core::roles::ROLE_ADMIN;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::RequireAdmin;
use crate::middleware::rate_limit::RateLimit;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: Identity,
}

/// Identity carried by an access token.
#[derive(Debug, Serialize)]
pub struct Identity {
    pub email: String,
    pub role: String,
    pub is_admin: bool,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate the administrator with email + password.
pub async fn login(
    _limit: RateLimit,
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let admin = &state.config.admin;

    if !input.email.trim().eq_ignore_ascii_case(&admin.email) {
        tracing::warn!(email = %input.email.trim(), "Login attempt with unknown email");
        return Err(invalid_credentials());
    }

    let password_valid = verify_password(&input.password, &admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(email = %admin.email, "Login attempt with wrong password");
        return Err(invalid_credentials());
    }

    let jwt = &state.config.jwt;
    let access_token = generate_access_token(&admin.email, ROLE_ADMIN, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(email = %admin.email, "Admin logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: jwt.expires_in_secs(),
            user: Identity {
                email: admin.email.clone(),
                role: ROLE_ADMIN.to_string(),
                is_admin: true,
            },
        },
    }))
}

/// GET /api/v1/auth/me
///
/// Echo the identity of a valid admin token.
pub async fn me(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<DataResponse<Identity>>> {
    let is_admin = admin.role == ROLE_ADMIN;
    Ok(Json(DataResponse {
        data: Identity {
            email: admin.email,
            role: admin.role,
            is_admin,
        },
    }))
}
