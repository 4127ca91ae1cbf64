//! Object storage abstraction for uploaded images.
//!
//! [`StorageBucket`] is the seam between image ingestion and whatever holds
//! the bytes. The API crate provides an HTTP implementation; this module
//! ships [`MemoryBucket`], used when no remote storage is configured and by
//! tests (it can be told to fail uploads or removals).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

/// Error type for storage bucket operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The request never completed (network, DNS, timeout, serialization).
    #[error("Storage request failed: {0}")]
    Request(String),

    /// The storage service answered with a non-2xx status.
    #[error("Storage returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Upload without upsert hit an existing object.
    #[error("Object '{0}' already exists")]
    AlreadyExists(String),

    /// The backend refused the operation.
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Options for [`StorageBucket::upload`].
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub content_type: String,
    /// Overwrite an existing object with the same name.
    pub upsert: bool,
}

/// An object listed from the bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub name: String,
    pub size: Option<u64>,
    pub content_type: Option<String>,
}

/// A bucket of publicly readable objects.
#[async_trait]
pub trait StorageBucket: Send + Sync {
    /// Store `bytes` under `name`. Returns the stored object path.
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<String, StorageError>;

    /// Public URL at which `name` is served.
    fn public_url(&self, name: &str) -> String;

    /// Delete the named objects. Unknown names are not an error.
    async fn remove(&self, names: &[String]) -> Result<(), StorageError>;

    /// List objects whose name starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError>;

    /// Recover the object name from a URL previously issued by
    /// [`public_url`](Self::public_url). Foreign URLs yield `None`.
    fn object_name_from_url(&self, url: &str) -> Option<String> {
        let base = self.public_url("");
        url.strip_prefix(base.as_str())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// MemoryBucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MemoryObject {
    bytes: Vec<u8>,
    content_type: String,
}

/// In-process bucket keeping objects in a map.
#[derive(Debug)]
pub struct MemoryBucket {
    base_url: String,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    uploads: AtomicUsize,
    fail_uploads: AtomicBool,
    fail_removals: AtomicBool,
}

impl MemoryBucket {
    /// Create an empty bucket serving objects under `base_url`.
    ///
    /// A trailing `/` is added when missing.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            base_url,
            objects: RwLock::new(BTreeMap::new()),
            uploads: AtomicUsize::new(0),
            fail_uploads: AtomicBool::new(false),
            fail_removals: AtomicBool::new(false),
        }
    }

    /// Number of upload calls received, successful or not.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    /// Make subsequent uploads fail.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent removals fail.
    pub fn set_fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }

    /// Bytes stored under `name`.
    pub async fn object(&self, name: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(name).map(|o| o.bytes.clone())
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.objects.read().await.contains_key(name)
    }

    /// Number of objects currently stored.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl StorageBucket for MemoryBucket {
    async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<String, StorageError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("uploads disabled".into()));
        }

        let mut objects = self.objects.write().await;
        if !options.upsert && objects.contains_key(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        objects.insert(
            name.to_string(),
            MemoryObject {
                bytes,
                content_type: options.content_type.clone(),
            },
        );
        Ok(name.to_string())
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}{name}", self.base_url)
    }

    async fn remove(&self, names: &[String]) -> Result<(), StorageError> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("removals disabled".into()));
        }
        let mut objects = self.objects.write().await;
        for name in names {
            objects.remove(name);
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<StoredObject>, StorageError> {
        let objects = self.objects.read().await;
        Ok(objects
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, obj)| StoredObject {
                name: name.clone(),
                size: Some(obj.bytes.len() as u64),
                content_type: Some(obj.content_type.clone()),
            })
            .collect())
    }
}
