//! Mock collaborators for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{NetworkError, SigningError};
use crate::traits::{SigningCapability, StorageNetwork, TransactionDecoder};
use crate::transaction::{
    RawTransaction, SignableRequest, SignedTransaction, TransactionObject, TransactionPayload,
    TransactionShape,
};
use crate::types::{BlobAttributes, StorageReservation, WriteBlobOutcome, WriteBlobRequest};

// ============================================================================
// Transaction
// ============================================================================

/// Structured transaction with configurable abilities.
#[derive(Debug, Clone, Default)]
pub struct MockTransaction {
    pub label: String,
    pub sender: Option<String>,
    pub sender_setter: bool,
    pub accessor: bool,
    pub serialized: Option<Vec<u8>>,
}

impl MockTransaction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_sender_setter(mut self) -> Self {
        self.sender_setter = true;
        self
    }

    pub fn with_accessor(mut self) -> Self {
        self.accessor = true;
        self
    }

    pub fn with_serialized(mut self, bytes: Vec<u8>) -> Self {
        self.serialized = Some(bytes);
        self
    }
}

impl TransactionObject for MockTransaction {
    fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({ "label": self.label, "sender": self.sender })
    }

    fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    fn has_sender_setter(&self) -> bool {
        self.sender_setter
    }

    fn set_sender(&mut self, sender: &str) {
        self.sender = Some(sender.to_string());
    }

    fn has_serializer(&self) -> bool {
        self.accessor
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "accessor": self.label, "sender": self.sender })
    }

    fn serialize(&self) -> Option<Vec<u8>> {
        self.serialized.clone()
    }
}

// ============================================================================
// Signer
// ============================================================================

/// Scripted signer response.
#[derive(Debug, Clone)]
pub enum SignBehavior {
    Sign,
    NoResult,
    Reject(String),
}

/// What the mock signer was asked to sign.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub sender: String,
    pub shape: TransactionShape,
    pub wrapped: bool,
    pub object_sender: Option<String>,
    pub payload: TransactionPayload,
}

/// Mock wallet. Signs everything unless scripted otherwise.
#[derive(Clone)]
pub struct MockSigner {
    address: String,
    script: Arc<Mutex<VecDeque<SignBehavior>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockSigner {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            script: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response for the next signing call.
    pub fn then(self, behavior: SignBehavior) -> Self {
        self.script.lock().unwrap().push_back(behavior);
        self
    }

    pub fn sign_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SigningCapability for MockSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(
        &self,
        request: &SignableRequest,
    ) -> Result<Option<SignedTransaction>, SigningError> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(RecordedRequest {
                sender: request.sender.clone(),
                shape: request.shape,
                wrapped: request.transaction.is_wrapped(),
                object_sender: request.transaction.inner().sender().map(str::to_string),
                payload: request.payload(),
            });
            requests.len()
        };

        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SignBehavior::Sign);

        match behavior {
            SignBehavior::Sign => Ok(Some(SignedTransaction {
                digest: format!("digest-{index}"),
                signature: Some(format!("sig-{index}")),
            })),
            SignBehavior::NoResult => Ok(None),
            SignBehavior::Reject(reason) => Err(SigningError::Rejected(reason)),
        }
    }
}

// ============================================================================
// Storage network
// ============================================================================

/// Recorded blob write.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub size: usize,
    pub epochs: u64,
    pub deletable: bool,
    pub owner: String,
    pub attributes: BlobAttributes,
}

#[derive(Default)]
struct NetworkState {
    reservation_errors: VecDeque<NetworkError>,
    write_results: VecDeque<Result<WriteBlobOutcome, NetworkError>>,
    read_errors: VecDeque<NetworkError>,
    reservations: Vec<StorageReservation>,
    writes: Vec<RecordedWrite>,
    blobs: HashMap<String, Vec<u8>>,
}

/// In-memory storage network.
///
/// Writes succeed with `mock-blob`/`mock-object` unless scripted otherwise.
#[derive(Clone)]
pub struct MockStorageNetwork {
    state: Arc<Mutex<NetworkState>>,
    reservation_as_bytes: bool,
    transfer_signings: usize,
    resets: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl MockStorageNetwork {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(NetworkState::default())),
            reservation_as_bytes: false,
            transfer_signings: 1,
            resets: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hand out the reservation transaction as raw bytes instead of an object.
    pub fn with_reservation_bytes(mut self) -> Self {
        self.reservation_as_bytes = true;
        self
    }

    /// Number of transactions `write_blob` signs through the request signer.
    pub fn with_transfer_signings(mut self, count: usize) -> Self {
        self.transfer_signings = count;
        self
    }

    pub fn push_reservation_error(&self, err: NetworkError) {
        self.state.lock().unwrap().reservation_errors.push_back(err);
    }

    pub fn push_write_result(&self, result: Result<WriteBlobOutcome, NetworkError>) {
        self.state.lock().unwrap().write_results.push_back(result);
    }

    pub fn push_read_error(&self, err: NetworkError) {
        self.state.lock().unwrap().read_errors.push_back(err);
    }

    pub fn reservations(&self) -> Vec<StorageReservation> {
        self.state.lock().unwrap().reservations.clone()
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().unwrap().writes.len()
    }

    pub fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Default for MockStorageNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionDecoder for MockStorageNetwork {
    fn decode_transaction(&self, bytes: &[u8]) -> Result<Box<dyn TransactionObject>, SigningError> {
        let label = std::str::from_utf8(bytes).map_err(|e| SigningError::Decode(e.to_string()))?;
        Ok(Box::new(MockTransaction::new(label).with_sender_setter()))
    }
}

#[async_trait]
impl StorageNetwork for MockStorageNetwork {
    fn name(&self) -> &str {
        "mock-network"
    }

    async fn reservation_transaction(
        &self,
        reservation: &StorageReservation,
    ) -> Result<RawTransaction, NetworkError> {
        {
            let mut state = self.state.lock().unwrap();
            state.reservations.push(reservation.clone());
            if let Some(err) = state.reservation_errors.pop_front() {
                return Err(err);
            }
        }

        let label = format!("reserve:{}:{}", reservation.size_bytes, reservation.epochs);
        if self.reservation_as_bytes {
            Ok(RawTransaction::Bytes(label.into_bytes()))
        } else {
            Ok(RawTransaction::Structured(Box::new(
                MockTransaction::new(label).with_sender_setter(),
            )))
        }
    }

    async fn write_blob(
        &self,
        request: WriteBlobRequest<'_>,
    ) -> Result<WriteBlobOutcome, NetworkError> {
        self.state.lock().unwrap().writes.push(RecordedWrite {
            size: request.blob.len(),
            epochs: request.epochs,
            deletable: request.deletable,
            owner: request.owner.to_string(),
            attributes: request.attributes.clone(),
        });

        for step in 0..self.transfer_signings {
            let tx = MockTransaction::new(format!("register:{step}")).with_sender_setter();
            request
                .signer
                .sign_transaction(RawTransaction::Structured(Box::new(tx)))
                .await?;
        }

        let mut state = self.state.lock().unwrap();
        let result = state.write_results.pop_front().unwrap_or_else(|| {
            Ok(WriteBlobOutcome {
                blob_id: Some("mock-blob".to_string()),
                object_id: Some("mock-object".to_string()),
            })
        });

        if let Ok(WriteBlobOutcome {
            blob_id: Some(blob_id),
            ..
        }) = &result
        {
            state.blobs.insert(blob_id.clone(), request.blob.to_vec());
        }

        result
    }

    async fn read_blob(&self, blob_id: &str) -> Result<Vec<u8>, NetworkError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.read_errors.pop_front() {
            return Err(err);
        }
        state
            .blobs
            .get(blob_id)
            .cloned()
            .ok_or_else(|| NetworkError::Rejected(format!("blob not found: {blob_id}")))
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::SerializableTransaction;

    #[tokio::test]
    async fn test_mock_signer_script() {
        let signer = MockSigner::new("0xa11ce")
            .then(SignBehavior::NoResult)
            .then(SignBehavior::Reject("user declined".into()));

        let request = || SignableRequest {
            sender: "0xa11ce".into(),
            shape: TransactionShape::Structured,
            transaction: SerializableTransaction::new(Box::new(MockTransaction::new("t"))),
        };

        assert_eq!(signer.sign(&request()).await.unwrap(), None);
        assert_eq!(
            signer.sign(&request()).await,
            Err(SigningError::Rejected("user declined".into()))
        );
        let signed = signer.sign(&request()).await.unwrap().unwrap();
        assert_eq!(signed.digest, "digest-3");
        assert_eq!(signer.sign_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_network_reservation_shapes() {
        let reservation = StorageReservation {
            size_bytes: 10,
            epochs: 2,
            owner: "0xa11ce".into(),
        };

        let structured = MockStorageNetwork::new();
        let tx = structured.reservation_transaction(&reservation).await.unwrap();
        assert_eq!(tx.shape(), TransactionShape::Structured);

        let bytes = MockStorageNetwork::new().with_reservation_bytes();
        let tx = bytes.reservation_transaction(&reservation).await.unwrap();
        let RawTransaction::Bytes(raw) = tx else {
            panic!("expected bytes");
        };
        let decoded = bytes.decode_transaction(&raw).unwrap();
        assert!(decoded.has_sender_setter());
        assert_eq!(decoded.snapshot()["label"], "reserve:10:2");
    }

    #[tokio::test]
    async fn test_mock_network_scripted_errors() {
        let network = MockStorageNetwork::new();
        network.push_read_error(NetworkError::RetryableClient("stale".into()));

        let err = network.read_blob("nope").await.unwrap_err();
        assert!(err.is_retryable_client());
        assert!(matches!(
            network.read_blob("nope").await,
            Err(NetworkError::Rejected(_))
        ));

        network.reset();
        assert_eq!(network.reset_count(), 1);
        assert_eq!(network.read_count(), 2);
    }
}
