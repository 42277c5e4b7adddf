//! Dual-source content: managed uploads or caller-supplied URLs.

use std::sync::Arc;

use storage_core::{
    ContentBlob, ContentDescriptor, RetentionPeriod, SigningCapability, StorageSource,
    UploadError,
};

use crate::orchestrator::UploadOrchestrator;
use crate::progress::ProgressSink;

/// Managed-mode input.
pub struct ManagedUpload<'a> {
    pub blob: ContentBlob,
    pub retention: RetentionPeriod,
    pub caller_address: &'a str,
    pub capability: &'a dyn SigningCapability,
}

/// Content the caller wants to reference.
pub enum ContentRequest<'a> {
    /// Upload through the orchestrator.
    Managed(ManagedUpload<'a>),
    /// Use an existing URL as-is.
    External { url: String },
}

impl ContentRequest<'_> {
    pub fn source(&self) -> StorageSource {
        match self {
            ContentRequest::Managed(_) => StorageSource::Managed,
            ContentRequest::External { .. } => StorageSource::External,
        }
    }
}

/// Produces a [`ContentDescriptor`] from either source.
#[derive(Debug, Clone)]
pub struct ContentResolver {
    orchestrator: Arc<UploadOrchestrator>,
}

impl ContentResolver {
    pub fn new(orchestrator: Arc<UploadOrchestrator>) -> Self {
        Self { orchestrator }
    }

    pub fn orchestrator(&self) -> &UploadOrchestrator {
        &self.orchestrator
    }

    pub async fn resolve(
        &self,
        request: ContentRequest<'_>,
        progress: &ProgressSink,
    ) -> Result<ContentDescriptor, UploadError> {
        match request {
            ContentRequest::Managed(upload) => {
                self.orchestrator
                    .upload(
                        upload.blob,
                        upload.retention,
                        upload.caller_address,
                        upload.capability,
                        progress,
                    )
                    .await
            }
            ContentRequest::External { url } => Self::external(url),
        }
    }

    /// Describe externally hosted content. No signing, no network.
    ///
    /// The URL is kept byte-for-byte; only blank input is rejected.
    pub fn external(url: String) -> Result<ContentDescriptor, UploadError> {
        if url.trim().is_empty() {
            return Err(UploadError::Validation("external URL is empty".to_string()));
        }
        tracing::debug!("Using external content: {}", url);
        Ok(ContentDescriptor::external(url))
    }
}
