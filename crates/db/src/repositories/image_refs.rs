//! Lookups across every column that stores a bucket URL.

use sqlx::PgPool;

/// Counts rows that point at a stored image.
pub struct ImageRefRepo;

impl ImageRefRepo {
    /// Number of committees, secretariat members and hotels whose image
    /// column equals `url`.
    pub async fn count(pool: &PgPool, url: &str) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM committees WHERE image_url = $1) \
             + (SELECT COUNT(*) FROM secretariates WHERE photo_url = $1) \
             + (SELECT COUNT(*) FROM hotels WHERE image_url = $1)",
        )
        .bind(url)
        .fetch_one(pool)
        .await?;
        Ok(count.0)
    }
}
