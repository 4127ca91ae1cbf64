//! Request validation helpers shared by create and update handlers.
//!
//! All checks run before any I/O and fail with [`CoreError::Validation`].

use chrono::NaiveTime;
use validator::{ValidateEmail, ValidateUrl};

use crate::error::CoreError;
use crate::patch::Patch;

/// Maximum length for short text columns (names, titles).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length for long free-text columns (descriptions, bios).
pub const MAX_TEXT_LEN: usize = 5000;

/// Ensure a required text field is present and non-blank after trimming.
pub fn require_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("Field '{field}' is required")));
    }
    Ok(())
}

/// Ensure a text value does not exceed `max` characters.
pub fn max_len(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "Field '{field}' must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Validate an email address (after trimming).
pub fn email(field: &str, value: &str) -> Result<(), CoreError> {
    if !value.trim().validate_email() {
        return Err(CoreError::Validation(format!(
            "Field '{field}' must be a valid email address"
        )));
    }
    Ok(())
}

/// Validate an optional website URL (after trimming).
pub fn website(field: &str, value: &str) -> Result<(), CoreError> {
    if !value.trim().validate_url() {
        return Err(CoreError::Validation(format!(
            "Field '{field}' must be a valid URL"
        )));
    }
    Ok(())
}

/// Run `check` on a patch value when one is supplied and non-blank.
///
/// Blank values are "no change" for the diff engine, so they are not
/// validated here either.
pub fn patch_value<F>(patch: &Patch<String>, check: F) -> Result<(), CoreError>
where
    F: FnOnce(&str) -> Result<(), CoreError>,
{
    match patch.value().map(|v| v.trim()) {
        Some(v) if !v.is_empty() => check(v),
        _ => Ok(()),
    }
}

/// Ensure `end` (when present) is strictly after `start`.
pub fn time_range(start: NaiveTime, end: Option<NaiveTime>) -> Result<(), CoreError> {
    match end {
        Some(end) if end <= start => Err(CoreError::Validation(
            "end_time must be after start_time".into(),
        )),
        _ => Ok(()),
    }
}

/// Ensure a count is at least `min`.
pub fn at_least(field: &str, value: i32, min: i32) -> Result<(), CoreError> {
    if value < min {
        return Err(CoreError::Validation(format!(
            "Field '{field}' must be at least {min}"
        )));
    }
    Ok(())
}
