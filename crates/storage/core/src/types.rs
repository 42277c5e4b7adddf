//! Common types for content uploads.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UploadError;
use crate::traits::TransactionSigner;

/// Seconds in one storage epoch (approximately one day).
pub const SECONDS_PER_EPOCH: u64 = 86_400;

// ============================================================================
// Content
// ============================================================================

/// Binary content supplied by the caller.
///
/// Immutable once built; dropped after the upload completes or fails.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentBlob {
    bytes: Vec<u8>,
    filename: String,
    mime_type: String,
    size_bytes: u64,
    last_modified: DateTime<Utc>,
}

impl ContentBlob {
    pub fn new(
        bytes: Vec<u8>,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        last_modified: DateTime<Utc>,
    ) -> Self {
        let size_bytes = bytes.len() as u64;
        Self {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.into(),
            size_bytes,
            last_modified,
        }
    }

    /// Read a local file into a blob.
    ///
    /// The MIME type is guessed from the file extension and the modification
    /// time is taken from the file metadata (falling back to now).
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, UploadError> {
        let path = path.as_ref();

        let bytes = tokio::fs::read(path).await.map_err(|e| {
            UploadError::Validation(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let last_modified = tokio::fs::metadata(path)
            .await
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(Utc::now);

        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                UploadError::Validation(format!("Path has no file name: {}", path.display()))
            })?;

        let mime_type = guess_mime_type(&filename);
        tracing::debug!(
            "Read {} ({} bytes, {}) from {}",
            filename,
            bytes.len(),
            mime_type,
            path.display()
        );

        Ok(Self::new(bytes, filename, mime_type, last_modified))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Consume the blob, yielding the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// Skip the payload; blobs can be megabytes.
impl fmt::Debug for ContentBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentBlob")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes)
            .field("last_modified", &self.last_modified)
            .finish()
    }
}

fn guess_mime_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogg" => "video/ogg",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

/// Media classification used when rendering a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify by file extension; anything unrecognized renders as an image.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if [".mp4", ".webm", ".ogg", ".mov"]
            .iter()
            .any(|ext| lower.ends_with(ext))
        {
            MediaKind::Video
        } else {
            MediaKind::Image
        }
    }
}

// ============================================================================
// Retention
// ============================================================================

/// Requested storage duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPeriod {
    pub requested_seconds: u64,
}

impl RetentionPeriod {
    pub const fn from_seconds(requested_seconds: u64) -> Self {
        Self { requested_seconds }
    }

    pub const fn from_days(days: u64) -> Self {
        Self::from_seconds(days.saturating_mul(SECONDS_PER_EPOCH))
    }

    /// Storage epochs covering the requested duration, rounded up.
    pub const fn epochs(&self) -> u64 {
        self.requested_seconds.div_ceil(SECONDS_PER_EPOCH)
    }
}

/// Storage space request, consumed once by the signed reservation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageReservation {
    pub size_bytes: u64,
    pub epochs: u64,
    pub owner: String,
}

// ============================================================================
// Transfer
// ============================================================================

/// Attribute set attached to every blob transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobAttributes {
    pub filename: String,
    pub content_type: String,
    pub size: String,
    pub last_modified: String,
    pub upload_time: String,
    pub origin: String,
}

impl BlobAttributes {
    pub fn new(blob: &ContentBlob, origin: impl Into<String>, upload_time: DateTime<Utc>) -> Self {
        Self {
            filename: blob.filename().to_string(),
            content_type: blob.mime_type().to_string(),
            size: blob.size_bytes().to_string(),
            last_modified: blob
                .last_modified()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            upload_time: upload_time.to_rfc3339_opts(SecondsFormat::Millis, true),
            origin: origin.into(),
        }
    }

    /// Attributes as ordered key/value pairs, keyed the way Walrus metadata expects.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("filename".to_string(), self.filename.clone()),
            ("contentType".to_string(), self.content_type.clone()),
            ("size".to_string(), self.size.clone()),
            ("lastModified".to_string(), self.last_modified.clone()),
            ("uploadTime".to_string(), self.upload_time.clone()),
            ("origin".to_string(), self.origin.clone()),
        ])
    }
}

/// Blob-write call handed to the storage network.
pub struct WriteBlobRequest<'a> {
    pub blob: &'a [u8],
    pub epochs: u64,
    pub deletable: bool,
    pub owner: &'a str,
    pub attributes: &'a BlobAttributes,
    pub signer: &'a dyn TransactionSigner,
}

/// Raw result of a blob write, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBlobOutcome {
    pub blob_id: Option<String>,
    pub object_id: Option<String>,
}

/// Durable result of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Content-addressed Walrus blob ID
    pub blob_id: String,
    /// Sui object ID; authoritative key for URL resolution when present
    pub object_id: Option<String>,
}

impl WriteBlobOutcome {
    /// Validate the outcome. A success without a blob ID is not a success.
    pub fn into_record(self) -> Result<BlobRecord, UploadError> {
        match self.blob_id {
            Some(blob_id) if !blob_id.is_empty() => Ok(BlobRecord {
                blob_id,
                object_id: self.object_id.filter(|id| !id.is_empty()),
            }),
            _ => Err(UploadError::Transfer(
                "storage network returned no blob ID".to_string(),
            )),
        }
    }
}

// ============================================================================
// Descriptor
// ============================================================================

/// Where the content lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageSource {
    Managed,
    External,
}

impl fmt::Display for StorageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageSource::Managed => f.write_str("managed"),
            StorageSource::External => f.write_str("external"),
        }
    }
}

/// Unified content reference consumed by downstream purchase logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDescriptor {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_id: Option<String>,
    pub storage_source: StorageSource,
}

impl ContentDescriptor {
    pub fn managed(url: String, blob_id: String) -> Self {
        Self {
            url,
            blob_id: Some(blob_id),
            storage_source: StorageSource::Managed,
        }
    }

    pub fn external(url: String) -> Self {
        Self {
            url,
            blob_id: None,
            storage_source: StorageSource::External,
        }
    }

    pub fn media_kind(&self) -> MediaKind {
        MediaKind::classify(&self.url)
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Caller-visible upload stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStage {
    Idle,
    Preparing,
    Signing,
    Uploading,
    Finalizing,
    Completed,
}

/// Progress snapshot delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadProgress {
    pub stage: UploadStage,
    pub percent: u8,
}

impl UploadProgress {
    pub fn new(stage: UploadStage, percent: u8) -> Self {
        Self {
            stage,
            percent: percent.min(100),
        }
    }

    pub const fn idle() -> Self {
        Self {
            stage: UploadStage::Idle,
            percent: 0,
        }
    }

    /// Whether a UI can settle on this value (done, or reset after failure).
    pub fn is_settled(&self) -> bool {
        matches!(self.stage, UploadStage::Completed | UploadStage::Idle)
    }
}
