//! Collaborator traits.
//!
//! - [`SigningCapability`]: the wallet (external, may block indefinitely)
//! - [`TransactionSigner`]: what a blob write uses to sign its own transactions
//! - [`TransactionDecoder`]: SDK-owned decoding of byte-encoded transactions
//! - [`StorageNetwork`]: reservation builder, blob write/read, client reset

use async_trait::async_trait;

use crate::error::{NetworkError, SigningError};
use crate::transaction::{RawTransaction, SignableRequest, SignedTransaction, TransactionObject};
use crate::types::{StorageReservation, WriteBlobOutcome, WriteBlobRequest};

// ============================================================================
// Signing
// ============================================================================

/// Something that can produce a valid signature for a transaction.
///
/// Trusted for the correctness of what it returns, never for timing.
#[async_trait]
pub trait SigningCapability: Send + Sync {
    /// Address the signatures are attributable to.
    fn address(&self) -> &str;

    /// Sign (and usually execute) a request.
    ///
    /// `Ok(None)` means the capability finished without producing anything;
    /// callers treat it as a failure.
    async fn sign(&self, request: &SignableRequest)
    -> Result<Option<SignedTransaction>, SigningError>;
}

/// Signer handed to collaborators that must sign transfer-time transactions.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn signer_address(&self) -> &str;

    async fn sign_transaction(
        &self,
        transaction: RawTransaction,
    ) -> Result<SignedTransaction, SigningError>;
}

/// Decodes byte-encoded transactions into structured objects.
pub trait TransactionDecoder: Send + Sync {
    fn decode_transaction(&self, bytes: &[u8]) -> Result<Box<dyn TransactionObject>, SigningError>;
}

// ============================================================================
// Storage network
// ============================================================================

/// Blob storage network collaborator.
///
/// Errors are classified; [`NetworkError::RetryableClient`] signals that the
/// client must be [`reset`](StorageNetwork::reset) and the whole operation
/// retried.
#[async_trait]
pub trait StorageNetwork: TransactionDecoder {
    /// Human-readable network name (e.g. "testnet").
    fn name(&self) -> &str;

    /// Build the transaction that reserves storage space.
    async fn reservation_transaction(
        &self,
        reservation: &StorageReservation,
    ) -> Result<RawTransaction, NetworkError>;

    /// Write blob bytes, signing any transfer-time transactions with `request.signer`.
    async fn write_blob(&self, request: WriteBlobRequest<'_>)
    -> Result<WriteBlobOutcome, NetworkError>;

    /// Read blob bytes by blob ID.
    async fn read_blob(&self, blob_id: &str) -> Result<Vec<u8>, NetworkError>;

    /// Discard internal client state after a retryable client error.
    fn reset(&self);
}
