//! Repository for the `quotes` table.

use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::types::DbId;

use crate::models::clean;
use crate::models::quote::{CreateQuote, Quote};
use crate::repositories::changeset;

const TABLE: &str = "quotes";

const COLUMNS: &str = "id, text, author, created_at, updated_at";

/// Provides CRUD operations for quotes.
pub struct QuoteRepo;

impl QuoteRepo {
    /// List quotes, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Quote>(&query).fetch_all(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateQuote) -> Result<Quote, sqlx::Error> {
        let query = format!(
            "INSERT INTO {TABLE} (text, author) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(input.text.trim())
            .bind(clean(&input.author))
            .fetch_one(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
    ) -> Result<Option<Quote>, sqlx::Error> {
        changeset::apply(pool, TABLE, COLUMNS, id, changes).await
    }

    /// Delete a quote by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("DELETE FROM {TABLE} WHERE id = $1");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
