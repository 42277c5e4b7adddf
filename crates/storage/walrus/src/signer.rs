//! Signing delegate: normalizes transactions and routes them to the wallet.
//!
//! Whatever shape a transaction arrives in, the capability always receives a
//! [`SignableRequest`] whose sender is the signer's address and whose payload
//! is reachable through a single serialization entry point:
//!
//! 1. Raw bytes are decoded into a structured object by the network's decoder.
//! 2. Objects with a sender setter get the signer's address.
//! 3. Objects without a serialization accessor are wrapped in one.

use async_trait::async_trait;
use storage_core::{
    RawTransaction, SerializableTransaction, SignableRequest, SignedTransaction, SigningCapability,
    SigningError, TransactionDecoder, TransactionSigner, UploadStage,
};

use crate::progress::{FINALIZING_PERCENT, ProgressSink, SIGNED_BUMP_PERCENT, SIGNING_PERCENT};

/// Adapter between collaborators that produce transactions and the wallet.
pub struct SigningDelegate<'a> {
    capability: &'a dyn SigningCapability,
    decoder: &'a dyn TransactionDecoder,
    progress: &'a ProgressSink,
    signer_address: &'a str,
}

impl<'a> SigningDelegate<'a> {
    pub fn new(
        capability: &'a dyn SigningCapability,
        decoder: &'a dyn TransactionDecoder,
        progress: &'a ProgressSink,
        signer_address: &'a str,
    ) -> Self {
        Self {
            capability,
            decoder,
            progress,
            signer_address,
        }
    }

    /// Resolve any transaction shape into a signable request.
    pub fn normalize(
        &self,
        raw: RawTransaction,
        signer_address: &str,
    ) -> Result<SignableRequest, SigningError> {
        let shape = raw.shape();

        let mut object = match raw {
            RawTransaction::Bytes(bytes) => {
                tracing::debug!("Decoding {}-byte transaction before signing", bytes.len());
                self.decoder.decode_transaction(&bytes)?
            }
            RawTransaction::Structured(object) => object,
        };

        if object.has_sender_setter() {
            object.set_sender(signer_address);
        }

        let transaction = SerializableTransaction::new(object);
        if transaction.is_wrapped() {
            tracing::trace!("Transaction has no serialization accessor, wrapped it");
        }

        Ok(SignableRequest {
            sender: signer_address.to_string(),
            shape,
            transaction,
        })
    }

    /// Normalize and sign. An empty result from the capability is an error.
    pub async fn normalize_and_sign(
        &self,
        raw: RawTransaction,
        signer_address: &str,
    ) -> Result<SignedTransaction, SigningError> {
        let request = self.normalize(raw, signer_address)?;

        let before = self.progress.current();
        let signing_percent = before.percent.max(SIGNING_PERCENT);
        self.progress.emit(UploadStage::Signing, signing_percent);

        tracing::debug!(
            "Requesting signature for {:?} transaction from {}",
            request.shape,
            request.sender
        );

        // Not under the transport timeout: the wallet may wait on the user.
        let signed = self
            .capability
            .sign(&request)
            .await?
            .ok_or(SigningError::NoResult)?;

        let resume = match before.stage {
            UploadStage::Idle | UploadStage::Completed => UploadStage::Signing,
            stage => stage,
        };
        let signed_percent = signing_percent
            .saturating_add(SIGNED_BUMP_PERCENT)
            .min(FINALIZING_PERCENT - 1);
        self.progress.emit(resume, signed_percent);

        tracing::debug!("✓ Transaction signed: {}", signed.digest);
        Ok(signed)
    }
}

#[async_trait]
impl TransactionSigner for SigningDelegate<'_> {
    fn signer_address(&self) -> &str {
        self.signer_address
    }

    async fn sign_transaction(
        &self,
        transaction: RawTransaction,
    ) -> Result<SignedTransaction, SigningError> {
        self.normalize_and_sign(transaction, self.signer_address).await
    }
}
