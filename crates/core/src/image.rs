//! Image ingestion: turn an inbound image reference into a stored URL.
//!
//! Clients send images in one of two shapes:
//!
//! - a data URL, `data:<mime>;[name=<filename>;]base64,<payload>`, carrying
//!   new bytes that must be uploaded;
//! - an absolute `http(s)` URL pointing at an image that is already hosted.
//!
//! [`ingest`] classifies the input, uploads only when there are new bytes,
//! and returns the URL to persist. Raw bytes never reach the database.

use std::sync::LazyLock;

use base64::Engine as _;
use regex::Regex;
use uuid::Uuid;

use crate::error::CoreError;
use crate::storage::{StorageBucket, UploadOptions};

/// Shortest base64 payload accepted. Anything smaller cannot be a real image.
pub const MIN_BASE64_PAYLOAD_LEN: usize = 100;

static DATA_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);(?:name=([^;,]+);)?base64,(.*)$")
        .expect("valid regex")
});

/// The parts of a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub filename: Option<String>,
    pub payload: String,
}

impl DataUrl {
    /// Decode the base64 payload.
    pub fn decode(&self) -> Result<Vec<u8>, CoreError> {
        base64::engine::general_purpose::STANDARD
            .decode(self.payload.as_bytes())
            .map_err(|e| CoreError::InvalidImageFormat(format!("Payload is not valid base64: {e}")))
    }
}

/// A classified image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    DataUrl(DataUrl),
    Url(String),
}

/// What [`ingest`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The input equals the stored URL. Nothing uploaded.
    Unchanged(String),
    /// A different, already-hosted absolute URL. Nothing uploaded.
    Adopted(String),
    /// New bytes were uploaded.
    Uploaded { url: String, object_name: String },
}

impl IngestOutcome {
    /// The URL to persist.
    pub fn url(&self) -> &str {
        match self {
            Self::Unchanged(url) | Self::Adopted(url) => url,
            Self::Uploaded { url, .. } => url,
        }
    }

    /// Name of the object uploaded by this ingestion, if any.
    pub fn uploaded_object(&self) -> Option<&str> {
        match self {
            Self::Uploaded { object_name, .. } => Some(object_name),
            _ => None,
        }
    }
}

/// Parse a `data:` URL.
pub fn parse_data_url(input: &str) -> Result<DataUrl, CoreError> {
    let caps = DATA_URL_RE.captures(input).ok_or_else(|| {
        CoreError::InvalidImageFormat(
            "Expected data:<mime>;[name=<file>;]base64,<payload>".into(),
        )
    })?;

    let mime_type = caps[1].to_ascii_lowercase();
    if !mime_type.starts_with("image/") {
        return Err(CoreError::InvalidImageFormat(format!(
            "Unsupported content type '{mime_type}'"
        )));
    }

    let payload: String = caps[3].chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if payload.len() < MIN_BASE64_PAYLOAD_LEN {
        return Err(CoreError::InvalidImageFormat(format!(
            "Image payload too short ({} characters, minimum {MIN_BASE64_PAYLOAD_LEN})",
            payload.len()
        )));
    }

    Ok(DataUrl {
        mime_type,
        filename: caps.get(2).map(|m| m.as_str().to_string()),
        payload,
    })
}

/// Classify an inbound image reference.
pub fn classify(input: &str) -> Result<ImageInput, CoreError> {
    let input = input.trim();

    if input.starts_with("data:") {
        return parse_data_url(input).map(ImageInput::DataUrl);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let parsed = url::Url::parse(input)
            .map_err(|e| CoreError::InvalidImageFormat(format!("Invalid image URL: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(CoreError::InvalidImageFormat(
                "Image URL must include a host".into(),
            ));
        }
        return Ok(ImageInput::Url(input.to_string()));
    }

    Err(CoreError::InvalidImageFormat(
        "Image must be a data URL or an absolute http(s) URL".into(),
    ))
}

/// File extension for an image MIME type.
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "image/avif" => "avif",
        "image/bmp" => "bmp",
        "image/heic" => "heic",
        _ => "bin",
    }
}

/// Reduce a client-supplied filename to a safe object name.
///
/// Drops any directory part and every character outside `[A-Za-z0-9._-]`
/// (spaces become `_`). Returns `None` when nothing usable remains.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .trim()
        .chars()
        .filter_map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '.' | '-' | '_' => Some(c),
            ' ' => Some('_'),
            _ => None,
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Hex characters of a v4 uuid used to make each object name unique.
const UPLOAD_TOKEN_LEN: usize = 12;

/// A fresh random token for [`object_name`].
pub fn upload_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(UPLOAD_TOKEN_LEN);
    token
}

/// Derive the object name for an upload.
///
/// Every upload gets its own object, so records never share one even when
/// clients reuse a filename: `<resource>_<token>_<filename>` with the
/// sanitized original filename (adding the MIME extension if it has none),
/// or `<resource>_<token>.<ext>` when there is no usable filename.
pub fn object_name(
    resource: &str,
    filename: Option<&str>,
    mime_type: &str,
    token: &str,
) -> String {
    let ext = extension_for_mime(mime_type);
    match filename.and_then(sanitize_filename) {
        Some(name) if name.contains('.') => format!("{resource}_{token}_{name}"),
        Some(name) => format!("{resource}_{token}_{name}.{ext}"),
        None => format!("{resource}_{token}.{ext}"),
    }
}

/// Resolve `input` to a stored URL, uploading to `bucket` when needed.
///
/// `current_url` is the value already stored on the record. An input
/// identical to it short-circuits before any classification or upload.
/// Uploads never overwrite: a name collision surfaces as an upload failure.
pub async fn ingest(
    bucket: &dyn StorageBucket,
    resource: &str,
    input: &str,
    current_url: Option<&str>,
) -> Result<IngestOutcome, CoreError> {
    let input = input.trim();

    if current_url == Some(input) {
        return Ok(IngestOutcome::Unchanged(input.to_string()));
    }

    match classify(input)? {
        ImageInput::Url(url) => Ok(IngestOutcome::Adopted(url)),
        ImageInput::DataUrl(data) => {
            let bytes = data.decode()?;
            let name = object_name(
                resource,
                data.filename.as_deref(),
                &data.mime_type,
                &upload_token(),
            );
            let options = UploadOptions {
                content_type: data.mime_type.clone(),
                upsert: false,
            };

            bucket
                .upload(&name, bytes, &options)
                .await
                .map_err(|e| CoreError::StorageUploadFailed(e.to_string()))?;

            Ok(IngestOutcome::Uploaded {
                url: bucket.public_url(&name),
                object_name: name,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::storage::MemoryBucket;

    /// 90 bytes encode to exactly 120 base64 characters.
    fn payload_120() -> String {
        let bytes: Vec<u8> = (0u8..90).collect();
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn bucket() -> MemoryBucket {
        MemoryBucket::new("http://localhost/storage/images")
    }

    #[test]
    fn parses_data_url_with_name() {
        let input = format!("data:image/jpeg;name=a.jpg;base64,{}", payload_120());
        let parsed = parse_data_url(&input).unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.filename.as_deref(), Some("a.jpg"));
        assert_eq!(parsed.payload.len(), 120);
        assert_eq!(parsed.decode().unwrap().len(), 90);
    }

    #[test]
    fn parses_data_url_without_name() {
        let input = format!("data:image/png;base64,{}", payload_120());
        let parsed = parse_data_url(&input).unwrap();
        assert_eq!(parsed.filename, None);
    }

    #[test]
    fn short_payload_is_rejected() {
        let input = "data:image/jpeg;base64,QUJDREVGR0g=";
        assert_matches!(parse_data_url(input), Err(CoreError::InvalidImageFormat(msg)) if msg.contains("too short"));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let long = payload_120();
        let cases = [
            format!("data:image/jpeg;{long}"),
            "data:image/jpeg;base64,".to_string(),
            "/uploads/profile.jpg".to_string(),
            "profile.jpg".to_string(),
            "ftp://example.com/a.jpg".to_string(),
            "https://".to_string(),
            String::new(),
            format!("data:text/plain;base64,{long}"),
        ];
        for case in &cases {
            assert_matches!(
                classify(case),
                Err(CoreError::InvalidImageFormat(_)),
                "input {case:?} should be rejected"
            );
        }
    }

    #[test]
    fn invalid_base64_fails_on_decode() {
        let input = format!("data:image/png;base64,{}", "!".repeat(120));
        let parsed = parse_data_url(&input).unwrap();
        assert_matches!(parsed.decode(), Err(CoreError::InvalidImageFormat(_)));
    }

    #[test]
    fn absolute_urls_classify_as_urls() {
        assert_eq!(
            classify(" https://cdn.example.org/x.png ").unwrap(),
            ImageInput::Url("https://cdn.example.org/x.png".into())
        );
    }

    #[test]
    fn object_names() {
        let token = "0123456789ab";
        assert_eq!(
            object_name("hotel", Some("a.jpg"), "image/jpeg", token),
            "hotel_0123456789ab_a.jpg"
        );
        assert_eq!(
            object_name("hotel", Some("../../My Photo.PNG"), "image/png", token),
            "hotel_0123456789ab_My_Photo.PNG"
        );
        assert_eq!(
            object_name("hotel", Some("avatar"), "image/webp", token),
            "hotel_0123456789ab_avatar.webp"
        );
        assert_eq!(
            object_name("committee", None, "image/jpeg", token),
            "committee_0123456789ab.jpg"
        );
        assert_eq!(
            object_name("committee", Some("///"), "image/gif", token),
            "committee_0123456789ab.gif"
        );
    }

    #[test]
    fn upload_tokens_differ() {
        let a = upload_token();
        assert_eq!(a.len(), UPLOAD_TOKEN_LEN);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, upload_token());
    }

    #[tokio::test]
    async fn data_url_is_uploaded_under_a_unique_name() {
        let bucket = bucket();
        let input = format!("data:image/jpeg;name=a.jpg;base64,{}", payload_120());

        let outcome = ingest(&bucket, "secretariate", &input, None).await.unwrap();

        let name = outcome.uploaded_object().unwrap().to_string();
        assert!(name.starts_with("secretariate_"), "{name}");
        assert!(name.ends_with("_a.jpg"), "{name}");
        assert_eq!(outcome.url(), format!("http://localhost/storage/images/{name}"));
        assert_eq!(bucket.upload_count(), 1);
        assert_eq!(bucket.object(&name).await.unwrap().len(), 90);
    }

    #[tokio::test]
    async fn same_filename_twice_yields_two_objects() {
        let bucket = bucket();
        let input = format!("data:image/png;name=lobby.png;base64,{}", payload_120());

        let first = ingest(&bucket, "hotel", &input, None).await.unwrap();
        let second = ingest(&bucket, "hotel", &input, Some(first.url())).await.unwrap();

        assert_ne!(first.url(), second.url());
        assert!(bucket.contains(first.uploaded_object().unwrap()).await);
        assert!(bucket.contains(second.uploaded_object().unwrap()).await);
    }

    #[tokio::test]
    async fn short_data_url_never_reaches_the_bucket() {
        let bucket = bucket();
        let result = ingest(&bucket, "hotel", "data:image/jpeg;base64,QUJDREVGR0g=", None).await;
        assert_matches!(result, Err(CoreError::InvalidImageFormat(_)));
        assert_eq!(bucket.upload_count(), 0);
    }

    #[tokio::test]
    async fn identical_url_is_idempotent() {
        let bucket = bucket();
        let current = "http://localhost/storage/images/a.jpg";

        for _ in 0..3 {
            let outcome = ingest(&bucket, "hotel", current, Some(current)).await.unwrap();
            assert_eq!(outcome, IngestOutcome::Unchanged(current.to_string()));
        }
        assert_eq!(bucket.upload_count(), 0);
    }

    #[tokio::test]
    async fn foreign_url_is_adopted_without_upload() {
        let bucket = bucket();
        let outcome = ingest(&bucket, "hotel", "https://cdn.example.org/x.png", Some("https://old"))
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Adopted("https://cdn.example.org/x.png".into()));
        assert_eq!(bucket.upload_count(), 0);
    }

    #[tokio::test]
    async fn upload_failure_maps_to_storage_error() {
        let bucket = bucket();
        bucket.set_fail_uploads(true);
        let input = format!("data:image/png;base64,{}", payload_120());
        assert_matches!(
            ingest(&bucket, "hotel", &input, None).await,
            Err(CoreError::StorageUploadFailed(_))
        );
    }
}
