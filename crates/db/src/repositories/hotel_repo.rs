//! Repository for the `hotels` table.

use sqlx::PgPool;
use summit_core::diff::ChangeSet;
use summit_core::types::DbId;

use crate::models::clean;
use crate::models::hotel::{CreateHotel, Hotel};
use crate::repositories::changeset;

const TABLE: &str = "hotels";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, description, address, website_url, image_url, created_at, updated_at";

/// Provides CRUD operations for partner hotels.
pub struct HotelRepo;

impl HotelRepo {
    /// List all hotels alphabetically.
    pub async fn list(pool: &PgPool) -> Result<Vec<Hotel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY name, id");
        sqlx::query_as::<_, Hotel>(&query).fetch_all(pool).await
    }

    /// Find a hotel by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hotel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {TABLE} WHERE id = $1");
        sqlx::query_as::<_, Hotel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a new hotel, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateHotel,
        image_url: Option<&str>,
    ) -> Result<Hotel, sqlx::Error> {
        let query = format!(
            "INSERT INTO {TABLE} (name, description, address, website_url, image_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotel>(&query)
            .bind(input.name.trim())
            .bind(clean(&input.description))
            .bind(clean(&input.address))
            .bind(clean(&input.website_url))
            .bind(image_url)
            .fetch_one(pool)
            .await
    }

    /// Write only the changed columns. Returns `None` if no row has that id.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ChangeSet,
    ) -> Result<Option<Hotel>, sqlx::Error> {
        changeset::apply(pool, TABLE, COLUMNS, id, changes).await
    }

    /// Delete a hotel by ID, returning the deleted row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Hotel>, sqlx::Error> {
        let query = format!("DELETE FROM {TABLE} WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Hotel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
