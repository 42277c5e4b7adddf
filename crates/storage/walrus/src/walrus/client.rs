//! Walrus HTTP storage network.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use storage_core::{
    NetworkError, RawTransaction, SigningError, StorageNetwork, StorageReservation,
    TransactionDecoder, TransactionObject, TransportError, WriteBlobOutcome, WriteBlobRequest,
};

use super::transaction::WalrusTransaction;
use super::types::BlobResponse;
use crate::config::{TransportConfig, WalrusConfig};
use crate::transport::RetryableTransport;

/// HTTP status the publisher uses when its view of the chain is stale.
const CONFLICT: u16 = 409;

/// Storage network backed by Walrus's public HTTP endpoints.
///
/// Requests go through a [`RetryableTransport`]. [`reset`](StorageNetwork::reset)
/// swaps in a fresh transport; requests already in flight keep the old one.
pub struct WalrusHttpNetwork {
    /// Network name (e.g. "testnet")
    name: String,

    /// Publisher endpoint (for storing blobs)
    publisher_url: String,

    /// Aggregator endpoint (for retrieving blobs)
    aggregator_url: String,

    transport_config: TransportConfig,
    transport: RwLock<Arc<RetryableTransport>>,
}

impl WalrusHttpNetwork {
    pub fn new(config: &WalrusConfig) -> Self {
        Self::with_endpoints(
            config.environment.as_str(),
            config.get_publisher_url(),
            config.get_aggregator_url(),
            config.transport,
        )
    }

    pub fn with_endpoints(
        name: impl Into<String>,
        publisher_url: impl Into<String>,
        aggregator_url: impl Into<String>,
        transport_config: TransportConfig,
    ) -> Self {
        Self {
            name: name.into(),
            publisher_url: trim_slash(publisher_url.into()),
            aggregator_url: trim_slash(aggregator_url.into()),
            transport_config,
            transport: RwLock::new(Arc::new(RetryableTransport::new(transport_config))),
        }
    }

    pub fn publisher_url(&self) -> &str {
        &self.publisher_url
    }

    pub fn aggregator_url(&self) -> &str {
        &self.aggregator_url
    }

    fn transport(&self) -> Arc<RetryableTransport> {
        self.transport
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// A conflict means the client must be rebuilt; everything else passes through.
fn classify(err: TransportError) -> NetworkError {
    match err.status() {
        Some(CONFLICT) => NetworkError::RetryableClient(err.to_string()),
        _ => NetworkError::Transport(err),
    }
}

impl TransactionDecoder for WalrusHttpNetwork {
    fn decode_transaction(&self, bytes: &[u8]) -> Result<Box<dyn TransactionObject>, SigningError> {
        Ok(Box::new(WalrusTransaction::from_bcs(bytes)?))
    }
}

#[async_trait]
impl StorageNetwork for WalrusHttpNetwork {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reservation_transaction(
        &self,
        reservation: &StorageReservation,
    ) -> Result<RawTransaction, NetworkError> {
        tracing::debug!(
            "Building reserve_space: {} bytes, {} epochs, owner={}",
            reservation.size_bytes,
            reservation.epochs,
            reservation.owner
        );
        Ok(RawTransaction::Structured(Box::new(
            WalrusTransaction::reserve_space(&self.name, reservation),
        )))
    }

    async fn write_blob(
        &self,
        request: WriteBlobRequest<'_>,
    ) -> Result<WriteBlobOutcome, NetworkError> {
        let register = WalrusTransaction::register_blob(
            &self.name,
            request.blob,
            request.epochs,
            request.deletable,
            request.owner,
            request.attributes,
        );
        let encoded = register.to_bcs().map_err(|e| {
            NetworkError::Rejected(format!("Failed to encode register_blob: {}", e))
        })?;

        let registered = request
            .signer
            .sign_transaction(RawTransaction::Bytes(encoded))
            .await?;
        tracing::debug!("register_blob signed: {}", registered.digest);

        let url = format!("{}/v1/blobs", self.publisher_url);
        tracing::debug!(
            "Uploading blob to Walrus: {} bytes, {} epochs, recipient={}",
            request.blob.len(),
            request.epochs,
            request.owner
        );

        let transport = self.transport();
        let builder = transport
            .http()
            .put(&url)
            .query(&[
                ("epochs", request.epochs.to_string()),
                ("deletable", request.deletable.to_string()),
                ("send_object_to", request.owner.to_string()),
            ])
            .header("Content-Type", "application/octet-stream")
            .body(request.blob.to_vec());

        let response = transport.send(builder).await.map_err(classify)?;
        tracing::debug!("Walrus response: {}", response.text());

        let blob_response: BlobResponse = serde_json::from_slice(&response.body).map_err(|e| {
            NetworkError::InvalidResponse(format!(
                "Failed to parse Walrus upload response: {}. Raw response: {}",
                e,
                response.text()
            ))
        })?;

        match &blob_response {
            BlobResponse::NewlyCreated(info) => tracing::info!(
                "✓ Blob stored in Walrus: {} (size: {} bytes, cost: {})",
                info.blob_object.blob_id,
                info.blob_object.size,
                info.cost
            ),
            BlobResponse::AlreadyCertified(info) => tracing::info!(
                "✓ Blob already certified in Walrus: {} (expires epoch: {})",
                info.blob_id,
                info.end_epoch
            ),
        }

        Ok(blob_response.into_outcome())
    }

    async fn read_blob(&self, blob_id: &str) -> Result<Vec<u8>, NetworkError> {
        let url = format!("{}/v1/blobs/{}", self.aggregator_url, blob_id);
        tracing::debug!("Downloading blob from Walrus: {}", blob_id);

        let transport = self.transport();
        let response = transport
            .send(transport.http().get(&url))
            .await
            .map_err(classify)?;

        tracing::debug!("✓ Blob downloaded from Walrus: {} bytes", response.body.len());
        Ok(response.body)
    }

    fn reset(&self) {
        tracing::warn!("Resetting Walrus client for {}", self.name);
        let fresh = Arc::new(RetryableTransport::new(self.transport_config));
        *self
            .transport
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
    }
}
