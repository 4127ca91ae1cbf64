//! Conference schedule models and DTOs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use summit_core::diff::{ChangeSet, Diff};
use summit_core::error::CoreError;
use summit_core::patch::Patch;
use summit_core::types::{DbId, Timestamp};
use summit_core::validation::{self, MAX_NAME_LEN, MAX_TEXT_LEN};

use super::{check_optional, check_patch};

/// A row from the `schedule_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduleEntry {
    pub id: DbId,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a schedule entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScheduleEntry {
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub title: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

impl CreateScheduleEntry {
    pub fn validate(&self) -> Result<(), CoreError> {
        validation::require_text("title", &self.title)?;
        validation::max_len("title", self.title.trim(), MAX_NAME_LEN)?;
        check_optional("location", &self.location, MAX_NAME_LEN)?;
        check_optional("description", &self.description, MAX_TEXT_LEN)?;
        validation::time_range(self.start_time, self.end_time)
    }
}

/// DTO for partially updating a schedule entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateScheduleEntry {
    #[serde(default)]
    pub day: Patch<NaiveDate>,
    #[serde(default)]
    pub start_time: Patch<NaiveTime>,
    #[serde(default)]
    pub end_time: Patch<NaiveTime>,
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub location: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
}

impl UpdateScheduleEntry {
    /// Request-only checks (no stored row needed).
    pub fn validate(&self) -> Result<(), CoreError> {
        self.day.forbid_null("day")?;
        self.start_time.forbid_null("start_time")?;
        self.title.forbid_null("title")?;
        check_patch("title", &self.title, MAX_NAME_LEN)?;
        check_patch("location", &self.location, MAX_NAME_LEN)?;
        check_patch("description", &self.description, MAX_TEXT_LEN)
    }

    /// Check the time range that would result from applying this patch.
    pub fn validate_against(&self, current: &ScheduleEntry) -> Result<(), CoreError> {
        let start = self.start_time.value().copied().unwrap_or(current.start_time);
        let end = match self.end_time {
            Patch::Missing => current.end_time,
            Patch::Null => None,
            Patch::Value(t) => Some(t),
        };
        validation::time_range(start, end)
    }

    pub fn changes(&self, current: &ScheduleEntry) -> ChangeSet {
        Diff::new()
            .date("day", current.day, &self.day)
            .time("start_time", current.start_time, &self.start_time)
            .optional_time("end_time", current.end_time, &self.end_time)
            .text("title", &current.title, &self.title)
            .optional_text("location", current.location.as_deref(), &self.location)
            .optional_text("description", current.description.as_deref(), &self.description)
            .finish()
    }
}
