//! Image handling shared by resources that carry a picture.
//!
//! Ingestion runs before any database write. If the write then fails, the
//! freshly uploaded object is removed again. Replaced and deleted images are
//! removed only once no row in any table points at them. That cleanup is
//! best effort: failures are logged, never returned.

use sqlx::PgPool;
use summit_core::image::{self, IngestOutcome};
use summit_core::patch::Patch;
use summit_core::storage::StorageBucket;
use summit_db::repositories::ImageRefRepo;

use crate::error::AppResult;

/// Result of resolving an image field from a request.
#[derive(Debug, Default)]
pub struct ResolvedImage {
    /// Patch to feed into the diff for the stored URL column.
    pub url: Patch<String>,
    /// Object uploaded by this request, if any.
    uploaded: Option<String>,
}

impl ResolvedImage {
    /// URL to store on create.
    pub fn url(&self) -> Option<&str> {
        self.url.value().map(String::as_str)
    }

    /// Remove the object uploaded by this request, if any.
    pub async fn discard(&self, storage: &dyn StorageBucket) {
        if let Some(name) = &self.uploaded {
            remove_best_effort(storage, name, "Failed to remove orphaned upload").await;
        }
    }

    /// Pass `result` through, discarding the upload if the write failed or
    /// found no row.
    pub async fn settle<T, E>(
        &self,
        storage: &dyn StorageBucket,
        result: Result<Option<T>, E>,
    ) -> Result<Option<T>, E> {
        if !matches!(result, Ok(Some(_))) {
            self.discard(storage).await;
        }
        result
    }
}

/// Resolve an optional image on create. Blank input means no image.
pub async fn ingest_new(
    storage: &dyn StorageBucket,
    resource: &str,
    input: Option<&str>,
) -> AppResult<ResolvedImage> {
    match input.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(ResolvedImage::default()),
        Some(input) => resolve(storage, resource, input, None).await,
    }
}

/// Resolve an image patch against the currently stored URL.
///
/// Missing or blank keeps the stored URL, `null` clears it, anything else
/// goes through ingestion.
pub async fn ingest_patch(
    storage: &dyn StorageBucket,
    resource: &str,
    patch: &Patch<String>,
    current: Option<&str>,
) -> AppResult<ResolvedImage> {
    match patch {
        Patch::Missing => Ok(ResolvedImage::default()),
        Patch::Null => Ok(ResolvedImage {
            url: Patch::Null,
            uploaded: None,
        }),
        Patch::Value(v) if v.trim().is_empty() => Ok(ResolvedImage::default()),
        Patch::Value(v) => resolve(storage, resource, v, current).await,
    }
}

async fn resolve(
    storage: &dyn StorageBucket,
    resource: &str,
    input: &str,
    current: Option<&str>,
) -> AppResult<ResolvedImage> {
    let outcome = image::ingest(storage, resource, input, current).await?;
    if let IngestOutcome::Uploaded { object_name, .. } = &outcome {
        tracing::info!(resource, object = %object_name, "Image uploaded");
    }
    Ok(ResolvedImage {
        uploaded: outcome.uploaded_object().map(str::to_string),
        url: Patch::Value(outcome.url().to_string()),
    })
}

/// Name of the bucket object `previous` pointed at, if the record has moved
/// off it and it lives in `storage`.
fn replaced_object(
    storage: &dyn StorageBucket,
    previous: Option<&str>,
    now: Option<&str>,
) -> Option<String> {
    let previous = previous?;
    if Some(previous) == now {
        return None;
    }
    let name = storage.object_name_from_url(previous)?;
    if now.and_then(|url| storage.object_name_from_url(url)).as_deref() == Some(name.as_str()) {
        return None;
    }
    Some(name)
}

/// After a committed update, remove the previously stored object when the
/// record no longer points at it and no other record does either.
pub async fn retire_replaced(
    storage: &dyn StorageBucket,
    pool: &PgPool,
    previous: Option<&str>,
    now: Option<&str>,
) {
    if let (Some(name), Some(url)) = (replaced_object(storage, previous, now), previous) {
        remove_unreferenced(storage, pool, &name, url, "Failed to remove replaced image").await;
    }
}

/// After a delete, remove the record's object unless another record still
/// points at it.
pub async fn remove_for_deleted(
    storage: &dyn StorageBucket,
    pool: &PgPool,
    url: Option<&str>,
) {
    let Some(url) = url else {
        return;
    };
    if let Some(name) = storage.object_name_from_url(url) {
        remove_unreferenced(storage, pool, &name, url, "Failed to remove image of deleted record")
            .await;
    }
}

async fn remove_unreferenced(
    storage: &dyn StorageBucket,
    pool: &PgPool,
    name: &str,
    url: &str,
    context: &'static str,
) {
    match ImageRefRepo::count(pool, url).await {
        Ok(0) => remove_best_effort(storage, name, context).await,
        Ok(refs) => {
            tracing::info!(object = name, refs, "Image still referenced, keeping it");
        }
        Err(e) => {
            tracing::warn!(
                object = name,
                error = %e,
                "Could not count image references, keeping it"
            );
        }
    }
}

async fn remove_best_effort(storage: &dyn StorageBucket, name: &str, context: &'static str) {
    if let Err(e) = storage.remove(&[name.to_string()]).await {
        tracing::warn!(object = name, error = %e, "{context}");
    }
}
