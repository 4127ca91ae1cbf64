//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope per project conventions.
//! Use [`DataResponse`] instead of ad-hoc `serde_json::json!({ "data": ... })`
//! to get compile-time type safety and consistent serialization.

use serde::Serialize;

/// Message reported when an update wrote something.
pub const MSG_UPDATED: &str = "Updated successfully";

/// Message reported when an update request matched the stored record.
pub const MSG_NO_CHANGES: &str = "No changes detected";

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Envelope for update endpoints.
///
/// `changed` is `false` when the diff came out empty and nothing was
/// written; this is a normal outcome, not an error.
#[derive(Debug, Serialize)]
pub struct UpdateResponse<T: Serialize> {
    pub data: T,
    pub changed: bool,
    pub message: &'static str,
}

impl<T: Serialize> UpdateResponse<T> {
    pub fn updated(data: T) -> Self {
        Self {
            data,
            changed: true,
            message: MSG_UPDATED,
        }
    }

    pub fn unchanged(data: T) -> Self {
        Self {
            data,
            changed: false,
            message: MSG_NO_CHANGES,
        }
    }
}
