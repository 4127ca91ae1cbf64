//! Storage bucket backed by a Supabase-compatible storage REST API.
//!
//! Objects are uploaded to `{url}/storage/v1/object/{bucket}/{name}` and
//! served publicly from `{url}/storage/v1/object/public/{bucket}/{name}`.
//! Every request authenticates with the service key.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use summit_core::storage::{StorageBucket, StorageError, StoredObject, UploadOptions};

/// HTTP request timeout for a single storage call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bucket name when `STORAGE_BUCKET` is not set.
const DEFAULT_BUCKET: &str = "images";

/// Page size for object listings.
const LIST_LIMIT: u32 = 1000;

/// Connection settings for the remote bucket.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service-role key used as bearer token.
    pub service_key: String,
    /// Bucket name.
    pub bucket: String,
}

impl StorageConfig {
    /// Load storage settings from environment variables.
    ///
    /// Returns `None` if `STORAGE_URL` or `STORAGE_SERVICE_KEY` is not set,
    /// in which case the server falls back to an in-memory bucket.
    ///
    /// | Variable              | Required | Default  |
    /// |-----------------------|----------|----------|
    /// | `STORAGE_URL`         | yes      | --       |
    /// | `STORAGE_SERVICE_KEY` | yes      | --       |
    /// | `STORAGE_BUCKET`      | no       | `images` |
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("STORAGE_URL").ok()?;
        let service_key = std::env::var("STORAGE_SERVICE_KEY").ok()?;
        Some(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
            bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    name: String,
    metadata: Option<ListMetadata>,
}

#[derive(Debug, Deserialize)]
struct ListMetadata {
    size: Option<u64>,
    mimetype: Option<String>,
}

/// [`StorageBucket`] talking to the storage service over HTTP.
pub struct HttpBucket {
    client: reqwest::Client,
    config: StorageConfig,
}

impl HttpBucket {
    /// Create a bucket client with a pre-configured HTTP client.
    pub fn new(config: StorageConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    fn object_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{name}",
            self.config.url, self.config.bucket
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .bearer_auth(&self.config.service_key)
            .header("apikey", &self.config.service_key)
    }

    /// Turn a non-2xx response into [`StorageError::Status`].
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

fn request_error(err: reqwest::Error) -> StorageError {
    StorageError::Request(err.to_string())
}

#[async_trait]
impl StorageBucket for HttpBucket {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        let response = self
            .authorized(self.client.post(self.object_url(name)))
            .header("content-type", &options.content_type)
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == reqwest::StatusCode::CONFLICT && !options.upsert {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        let response = Self::check(response).await?;
        let uploaded: UploadResponse = response.json().await.map_err(request_error)?;

        tracing::debug!(bucket = %self.config.bucket, name, size, "Uploaded object");
        Ok(uploaded
            .key
            .unwrap_or_else(|| format!("{}/{name}", self.config.bucket)))
    }

    fn public_url(&self, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{name}",
            self.config.url, self.config.bucket
        )
    }

    async fn remove(&self, names: &[String]) -> Result<(), StorageError> {
        if names.is_empty() {
            return Ok(());
        }
        let url = format!("{}/storage/v1/object/{}", self.config.url, self.config.bucket);
        let response = self
            .authorized(self.client.delete(url))
            .json(&json!({ "prefixes": names }))
            .send()
            .await
            .map_err(request_error)?;
        Self::check(response).await?;

        tracing::debug!(bucket = %self.config.bucket, count = names.len(), "Removed objects");
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let url = format!(
            "{}/storage/v1/object/list/{}",
            self.config.url, self.config.bucket
        );
        let response = self
            .authorized(self.client.post(url))
            .json(&json!({
                "prefix": "",
                "search": prefix,
                "limit": LIST_LIMIT,
                "offset": 0,
                "sortBy": { "column": "name", "order": "asc" },
            }))
            .send()
            .await
            .map_err(request_error)?;
        let entries: Vec<ListEntry> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(request_error)?;

        Ok(entries
            .into_iter()
            .filter(|e| e.name.starts_with(prefix))
            .map(|e| {
                let (size, content_type) = match e.metadata {
                    Some(m) => (m.size, m.mimetype),
                    None => (None, None),
                };
                StoredObject {
                    name: e.name,
                    size,
                    content_type,
                }
            })
            .collect())
    }
}
