//! Repository for the `schools` table (delegation registrations).

use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::types::DbId;

use crate::models::clean;
use crate::models::school::{CreateSchool, School};
use crate::repositories::changeset;

const TABLE: &str = "schools";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, school_name, advisor_name, advisor_email, phone, delegate_count, notes, \
    created_at, updated_at";

/// Provides CRUD operations for school registrations.
pub struct SchoolRepo;

impl SchoolRepo {
    /// List registrations, most recent first.
    pub async fn list(pool: &PgPool) -> Result<Vec<School>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, School>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<School>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        sqlx::query_as::<_, School>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a registration.
    ///
    /// A second registration for the same school name and advisor email
    /// (case-insensitive) violates `uq_schools_name_email`.
    pub async fn create(pool: &PgPool, input: &CreateSchool) -> Result<School, sqlx::Error> {
        let query = format!(
            "INSERT INTO {TABLE} \
                 (school_name, advisor_name, advisor_email, phone, delegate_count, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, School>(&query)
            .bind(input.school_name.trim())
            .bind(input.advisor_name.trim())
            .bind(input.advisor_email.trim())
            .bind(clean(&input.phone))
            .bind(input.delegate_count)
            .bind(clean(&input.notes))
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
    ) -> Result<Option<School>, sqlx::Error> {
        changeset::apply(pool, TABLE, COLUMNS, id, changes).await
    }

    /// Total delegates across all registrations.
    pub async fn total_delegates(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COALESCE(SUM(delegate_count), 0)::BIGINT FROM {TABLE}");
        sqlx::query_scalar::<_, i64>(&query).fetch_one(pool).await
    }

    /// Delete a registration by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {TABLE} WHERE id = $1");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
