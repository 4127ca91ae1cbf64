//! Repository for the `schedule_entries` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::types::DbId;

use crate::models::clean;
use crate::models::schedule::{CreateScheduleEntry, ScheduleEntry};
use crate::repositories::changeset;

const TABLE: &str = "schedule_entries";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, day, start_time, end_time, title, location, description, created_at, updated_at";

/// Provides CRUD operations for the conference schedule.
pub struct ScheduleRepo;

impl ScheduleRepo {
    /// List entries chronologically, optionally restricted to one day.
    pub async fn list(
        pool: &PgPool,
        day: Option<NaiveDate>,
    ) -> Result<Vec<ScheduleEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {TABLE} \
             WHERE ($1::date IS NULL OR day = $1) \
             ORDER BY day, start_time, id"
        );
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(day)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ScheduleEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        input: &CreateScheduleEntry,
    ) -> Result<ScheduleEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO {TABLE} (day, start_time, end_time, title, location, description) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScheduleEntry>(&query)
            .bind(input.day)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.title.trim())
            .bind(clean(&input.location))
            .bind(clean(&input.description))
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
    ) -> Result<Option<ScheduleEntry>, sqlx::Error> {
        changeset::apply(pool, TABLE, COLUMNS, id, changes).await
    }

    /// Delete an entry by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {TABLE} WHERE id = $1");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
