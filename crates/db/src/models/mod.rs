//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all [`Patch`] fields) plus its diff against
//!   the stored row
//!
//! [`Patch`]: summit_core::patch::Patch

pub mod committee;
pub mod hotel;
pub mod quote;
pub mod schedule;
pub mod school;
pub mod secretariate;

use summit_core::error::CoreError;
use summit_core::patch::Patch;
use summit_core::validation;

/// Trim an optional text input, mapping blank strings to `None`.
pub(crate) fn clean(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Length check for an optional create field.
pub(crate) fn check_optional(
    field: &str,
    value: &Option<String>,
    max: usize,
) -> Result<(), CoreError> {
    match clean(value) {
        Some(v) => validation::max_len(field, v, max),
        None => Ok(()),
    }
}

/// Length check for a patch field.
pub(crate) fn check_patch(field: &str, patch: &Patch<String>, max: usize) -> Result<(), CoreError> {
    validation::patch_value(patch, |v| validation::max_len(field, v, max))
}
