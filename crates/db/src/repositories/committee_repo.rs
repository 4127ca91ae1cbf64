//! Repository for the `committees` table.

use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::ordering::Slot;
use summit_core::types::{DbId, Position};

use crate::error::DbError;
use crate::models::clean;
use crate::models::committee::{Committee, CreateCommittee};
use crate::repositories::changeset;
use crate::repositories::ordering::{self, OrderedTable};

const TABLE: &str = "committees";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, abbreviation, topic, description, chair_name, image_url, \
    position, created_at, updated_at";

/// Provides CRUD operations for committees.
pub struct CommitteeRepo;

impl CommitteeRepo {
    /// List all committees in display order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Committee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY position, id");
        sqlx::query_as::<_, Committee>(&query).fetch_all(pool).await
    }

    /// Find a committee by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Committee>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        sqlx::query_as::<_, Committee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a committee, appending it to the end of the list unless the
    /// DTO names a position.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCommittee,
        image_url: Option<&str>,
    ) -> Result<Committee, sqlx::Error> {
        let query = format!(
            "INSERT INTO {TABLE} \
                 (name, abbreviation, topic, description, chair_name, image_url, position) \
             VALUES ($1, $2, $3, $4, $5, $6, \
                 COALESCE($7, (SELECT COALESCE(MAX(position), 0) + 1 FROM {TABLE}))) \
             RETURNING {COLUMNS}"
        );
        // Concurrent appends can compute the same MAX + 1; re-run the insert.
        let mut tries = 1;
        loop {
            let result = sqlx::query_as::<_, Committee>(&query)
                .bind(input.name.trim())
                .bind(clean(&input.abbreviation))
                .bind(clean(&input.topic))
                .bind(clean(&input.description))
                .bind(clean(&input.chair_name))
                .bind(image_url)
                .bind(input.position)
                .fetch_one(pool)
                .await;
            match result {
                Err(e)
                    if input.position.is_none()
                        && tries < ordering::POSITION_ATTEMPTS
                        && ordering::is_position_conflict(&e) =>
                {
                    tries += 1;
                }
                other => return other,
            }
        }
    }

    /// Apply field changes and an optional position swap in one transaction.
    ///
    /// Returns `None` if the committee does not exist. With an empty change
    /// set and no position the row is returned unchanged and nothing is
    /// written.
    ///
    /// The transaction is re-run when a concurrent move claims the requested
    /// position first.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
        position: Option<Position>,
    ) -> Result<Option<Committee>, DbError> {
        ordering::retry_position_conflicts(OrderedTable::Committees, || {
            Self::update_once(pool, id, changes, position)
        })
        .await
    }

    async fn update_once(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
        position: Option<Position>,
    ) -> Result<Option<Committee>, DbError> {
        let mut tx = pool.begin().await?;

        if let Some(requested) = position {
            if ordering::swap_position(&mut tx, OrderedTable::Committees, id, requested)
                .await?
                .is_none()
            {
                return Ok(None);
            }
        }

        let updated = if changes.is_empty() {
            let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
            sqlx::query_as::<_, Committee>(&query)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            changeset::apply::<Committee, _>(&mut *tx, TABLE, COLUMNS, id, changes).await?
        };

        tx.commit().await?;
        Ok(updated)
    }

    /// Assign positions in bulk.
    pub async fn reorder(pool: &PgPool, entries: &[Slot]) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        ordering::reorder(&mut tx, OrderedTable::Committees, entries).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a committee by ID, returning the deleted row.
    ///
    /// The position it held is left as a gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Committee>, sqlx::Error> {
        let query = format!("DELETE FROM {TABLE} WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Committee>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
