//! Upload orchestrator.
//!
//! Drives one upload through its stages:
//!
//! ```text
//! Idle → Preparing → Signing → Uploading → Finalizing → Completed
//!                 ↘           ↘          ↘             ↘
//!                                Failed
//! ```
//!
//! The reservation is signed before any blob bytes leave the process; the
//! transfer never starts without a signed reservation. A retryable client
//! error resets the storage network and restarts from the reservation, up to
//! [`OrchestratorOptions::max_client_resets`] times.

use std::sync::Arc;

use chrono::Utc;
use storage_core::{
    BlobAttributes, BlobRecord, ContentBlob, ContentDescriptor, RetentionPeriod, SigningCapability,
    SigningError, StorageNetwork, StorageReservation, TransactionDecoder, TransactionObject,
    UploadError, UploadStage, WriteBlobRequest,
};

use crate::config::WalrusConfig;
use crate::progress::{
    COMPLETED_PERCENT, FINALIZING_PERCENT, PREPARING_PERCENT, ProgressSink, UPLOADING_PERCENT,
};
use crate::resolver::BlobUrlResolver;
use crate::signer::SigningDelegate;
use crate::walrus::WalrusHttpNetwork;

/// Orchestrator state for a single upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Preparing,
    Signing,
    Uploading,
    Finalizing,
    Completed,
    Failed,
}

impl UploadState {
    /// Stage reported to progress observers (`Failed` reports as idle).
    pub fn stage(&self) -> UploadStage {
        match self {
            UploadState::Idle | UploadState::Failed => UploadStage::Idle,
            UploadState::Preparing => UploadStage::Preparing,
            UploadState::Signing => UploadStage::Signing,
            UploadState::Uploading => UploadStage::Uploading,
            UploadState::Finalizing => UploadStage::Finalizing,
            UploadState::Completed => UploadStage::Completed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Completed | UploadState::Failed)
    }
}

/// Orchestrator tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Client resets allowed per operation before giving up
    pub max_client_resets: u32,

    /// Whether uploaded blobs can be deleted by their owner
    pub deletable: bool,

    /// Value of the `origin` blob attribute
    pub origin: String,

    /// Lease length used by [`UploadOrchestrator::default_retention`]
    pub default_retention_days: u64,

    /// Build a blob-ID URL when the network returns no object ID.
    /// When disabled the addressing error is surfaced instead.
    pub blob_url_fallback: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            max_client_resets: 3,
            deletable: true,
            origin: "unknown".to_string(),
            default_retention_days: 30,
            blob_url_fallback: true,
        }
    }
}

impl OrchestratorOptions {
    pub fn from_config(config: &WalrusConfig) -> Self {
        Self {
            max_client_resets: config.transport.max_retries,
            origin: config.origin.clone(),
            default_retention_days: config.default_retention_days,
            ..Self::default()
        }
    }
}

/// Tracks the current state and mirrors it to the progress sink.
struct StateMachine<'p> {
    state: UploadState,
    progress: &'p ProgressSink,
}

impl<'p> StateMachine<'p> {
    fn new(progress: &'p ProgressSink) -> Self {
        Self {
            state: UploadState::Idle,
            progress,
        }
    }

    /// Move to `next` and report it at `percent`.
    fn enter(&mut self, next: UploadState, percent: u8) {
        self.transition(next);
        self.progress.emit(next.stage(), percent);
    }

    /// Move to `next` without reporting (the signing delegate reports its own progress).
    fn transition(&mut self, next: UploadState) {
        tracing::trace!("Upload state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self) -> UploadState {
        let failed_in = self.state;
        self.transition(UploadState::Failed);
        self.progress.reset();
        failed_in
    }
}

/// Presents a shared storage network as the delegate's decoder.
struct NetworkDecoder<'a>(&'a dyn StorageNetwork);

impl TransactionDecoder for NetworkDecoder<'_> {
    fn decode_transaction(&self, bytes: &[u8]) -> Result<Box<dyn TransactionObject>, SigningError> {
        self.0.decode_transaction(bytes)
    }
}

/// Turns a file, a retention period and a signing capability into a
/// durable blob identifier and a resolvable URL.
pub struct UploadOrchestrator {
    network: Arc<dyn StorageNetwork>,
    resolver: BlobUrlResolver,
    options: OrchestratorOptions,
}

impl UploadOrchestrator {
    pub fn new(
        network: Arc<dyn StorageNetwork>,
        resolver: BlobUrlResolver,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            network,
            resolver,
            options,
        }
    }

    /// Build an orchestrator backed by the Walrus HTTP network.
    pub fn from_config(config: &WalrusConfig) -> Self {
        Self::new(
            Arc::new(WalrusHttpNetwork::new(config)),
            BlobUrlResolver::from_config(config),
            OrchestratorOptions::from_config(config),
        )
    }

    pub fn network(&self) -> &Arc<dyn StorageNetwork> {
        &self.network
    }

    pub fn resolver(&self) -> &BlobUrlResolver {
        &self.resolver
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    pub fn default_retention(&self) -> RetentionPeriod {
        RetentionPeriod::from_days(self.options.default_retention_days)
    }

    /// Upload `blob` for `retention`, signing with `capability` on behalf of `caller_address`.
    ///
    /// The capability must sign as `caller_address`; a mismatch is rejected
    /// before any network call. On failure the progress sink is reset to idle
    /// and the classified error is returned. Reservations signed by a failed attempt are not reclaimed.
    pub async fn upload(
        &self,
        blob: ContentBlob,
        retention: RetentionPeriod,
        caller_address: &str,
        capability: &dyn SigningCapability,
        progress: &ProgressSink,
    ) -> Result<ContentDescriptor, UploadError> {
        let owner = caller_address.trim();
        if owner.is_empty() {
            return Err(UploadError::Validation("caller address is empty".to_string()));
        }
        if capability.address().trim() != owner {
            return Err(UploadError::Validation(format!(
                "signing capability address {} does not match caller {}",
                capability.address(),
                owner
            )));
        }

        let mut machine = StateMachine::new(progress);
        match self
            .run(&blob, retention, owner, capability, &mut machine)
            .await
        {
            Ok(descriptor) => Ok(descriptor),
            Err(err) => {
                let failed_in = machine.fail();
                tracing::error!(
                    "Upload of {} failed during {:?}: {}",
                    blob.filename(),
                    failed_in,
                    err
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        blob: &ContentBlob,
        retention: RetentionPeriod,
        owner: &str,
        capability: &dyn SigningCapability,
        machine: &mut StateMachine<'_>,
    ) -> Result<ContentDescriptor, UploadError> {
        machine.enter(UploadState::Preparing, PREPARING_PERCENT);

        let epochs = retention.epochs();
        let reservation = StorageReservation {
            size_bytes: blob.size_bytes(),
            epochs,
            owner: owner.to_string(),
        };
        let attributes = BlobAttributes::new(blob, self.options.origin.as_str(), Utc::now());

        tracing::debug!(
            "Uploading {} ({} bytes, {}) for {} epochs on {}",
            blob.filename(),
            blob.size_bytes(),
            blob.mime_type(),
            epochs,
            self.network.name()
        );

        let mut resets = 0;
        let record = loop {
            match self
                .attempt(blob, &reservation, &attributes, capability, machine)
                .await
            {
                Ok(record) => break record,
                Err(UploadError::RetryableClient { message, .. })
                    if resets < self.options.max_client_resets =>
                {
                    resets += 1;
                    tracing::warn!(
                        "Retryable storage client error: {}. Resetting client (reset {}/{})",
                        message,
                        resets,
                        self.options.max_client_resets
                    );
                    self.network.reset();
                    machine.enter(UploadState::Preparing, PREPARING_PERCENT);
                }
                Err(UploadError::RetryableClient { message, .. }) => {
                    return Err(UploadError::RetryableClient {
                        attempts: resets,
                        message,
                    });
                }
                Err(err) => return Err(err),
            }
        };

        machine.enter(UploadState::Finalizing, FINALIZING_PERCENT);
        let url = self.blob_url(&record)?;

        machine.enter(UploadState::Completed, COMPLETED_PERCENT);
        tracing::info!(
            "✓ Blob uploaded to Walrus: {} ({} bytes, {} epochs) → {}",
            record.blob_id,
            blob.size_bytes(),
            epochs,
            url
        );

        Ok(ContentDescriptor::managed(url, record.blob_id))
    }

    /// One pass from reservation to validated transfer result.
    async fn attempt(
        &self,
        blob: &ContentBlob,
        reservation: &StorageReservation,
        attributes: &BlobAttributes,
        capability: &dyn SigningCapability,
        machine: &mut StateMachine<'_>,
    ) -> Result<BlobRecord, UploadError> {
        let decoder = NetworkDecoder(self.network.as_ref());
        let delegate = SigningDelegate::new(
            capability,
            &decoder,
            machine.progress,
            &reservation.owner,
        );

        machine.transition(UploadState::Signing);
        let reservation_tx = self.network.reservation_transaction(reservation).await?;
        let signed = delegate
            .normalize_and_sign(reservation_tx, &reservation.owner)
            .await?;
        tracing::info!("✓ Storage reservation signed: {}", signed.digest);

        machine.enter(UploadState::Uploading, UPLOADING_PERCENT);
        let outcome = self
            .network
            .write_blob(WriteBlobRequest {
                blob: blob.bytes(),
                epochs: reservation.epochs,
                deletable: self.options.deletable,
                owner: &reservation.owner,
                attributes,
                signer: &delegate,
            })
            .await?;

        outcome.into_record()
    }

    fn blob_url(&self, record: &BlobRecord) -> Result<String, UploadError> {
        match self.resolver.resolve_url(record.object_id.as_deref()) {
            Ok(url) => Ok(url),
            Err(err) if self.options.blob_url_fallback => {
                let url = self.resolver.blob_fallback_url(&record.blob_id);
                tracing::warn!("{}; using blob ID URL {}", err, url);
                Ok(url)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Read blob bytes by blob ID, resetting the client on retryable errors.
    pub async fn read_blob(&self, blob_id: &str) -> Result<Vec<u8>, UploadError> {
        if blob_id.trim().is_empty() {
            return Err(UploadError::Validation("blob ID is empty".to_string()));
        }

        let mut resets = 0;
        loop {
            match self.network.read_blob(blob_id).await {
                Ok(bytes) => {
                    tracing::debug!("✓ Blob read: {} ({} bytes)", blob_id, bytes.len());
                    return Ok(bytes);
                }
                Err(err)
                    if err.is_retryable_client() && resets < self.options.max_client_resets =>
                {
                    resets += 1;
                    tracing::warn!(
                        "Retryable error reading {}: {}. Resetting client (reset {}/{})",
                        blob_id,
                        err,
                        resets,
                        self.options.max_client_resets
                    );
                    self.network.reset();
                }
                Err(err) => {
                    tracing::error!("Failed to read blob {}: {}", blob_id, err);
                    return Err(match UploadError::from(err) {
                        UploadError::RetryableClient { message, .. } => {
                            UploadError::RetryableClient {
                                attempts: resets,
                                message,
                            }
                        }
                        other => other,
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for UploadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadOrchestrator")
            .field("network", &self.network.name())
            .field("resolver", &self.resolver)
            .field("options", &self.options)
            .finish()
    }
}
