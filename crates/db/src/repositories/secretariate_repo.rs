//! Repository for the `secretariates` table.

use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::ordering::Slot;
use summit_core::types::{DbId, Position};

use crate::error::DbError;
use crate::models::clean;
use crate::models::secretariate::{CreateSecretariate, Secretariate};
use crate::repositories::changeset;
use crate::repositories::ordering::{self, OrderedTable};

const TABLE: &str = "secretariates";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, title, bio, email, photo_url, position, created_at, updated_at";

/// Provides CRUD operations for secretariate members.
pub struct SecretariateRepo;

impl SecretariateRepo {
    /// List all secretariate members in display order.
    pub async fn list(pool: &PgPool) -> Result<Vec<Secretariate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY position, id");
        sqlx::query_as::<_, Secretariate>(&query).fetch_all(pool).await
    }

    /// Find a secretariate member by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Secretariate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        sqlx::query_as::<_, Secretariate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a member at the end of the list unless the DTO names a position.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSecretariate,
        photo_url: Option<&str>,
    ) -> Result<Secretariate, sqlx::Error> {
        let query = format!(
            "INSERT INTO {TABLE} \
                 (name, title, bio, email, photo_url, position) \
             VALUES ($1, $2, $3, $4, $5, \
                 COALESCE($6, (SELECT COALESCE(MAX(position), 0) + 1 FROM {TABLE}))) \
             RETURNING {COLUMNS}"
        );
        // Concurrent appends can compute the same MAX + 1; re-run the insert.
        let mut tries = 1;
        loop {
            let result = sqlx::query_as::<_, Secretariate>(&query)
                .bind(input.name.trim())
                .bind(input.title.trim())
                .bind(clean(&input.bio))
                .bind(clean(&input.email))
                .bind(photo_url)
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
    /// Returns `None` if the member does not exist.
    ///
    /// The transaction is re-run when a concurrent move claims the requested
    /// position first.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
        position: Option<Position>,
    ) -> Result<Option<Secretariate>, DbError> {
        ordering::retry_position_conflicts(OrderedTable::Secretariates, || {
            Self::update_once(pool, id, changes, position)
        })
        .await
    }

    async fn update_once(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
        position: Option<Position>,
    ) -> Result<Option<Secretariate>, DbError> {
        let mut tx = pool.begin().await?;

        if let Some(requested) = position {
            if ordering::swap_position(&mut tx, OrderedTable::Secretariates, id, requested)
                .await?
                .is_none()
            {
                return Ok(None);
            }
        }

        let updated = if changes.is_empty() {
            let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
            sqlx::query_as::<_, Secretariate>(&query)
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            changeset::apply::<Secretariate, _>(&mut *tx, TABLE, COLUMNS, id, changes).await?
        };

        tx.commit().await?;
        Ok(updated)
    }

    /// Assign positions in bulk.
    pub async fn reorder(pool: &PgPool, entries: &[Slot]) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        ordering::reorder(&mut tx, OrderedTable::Secretariates, entries).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a secretariate member by ID, returning the deleted row.
    ///
    /// The position it held is left as a gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Secretariate>, sqlx::Error> {
        let query = format!("DELETE FROM {TABLE} WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Secretariate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
