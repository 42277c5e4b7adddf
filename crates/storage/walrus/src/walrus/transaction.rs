//! BCS-encoded storage transactions.
//!
//! BCS is Sui's canonical serialization for Move call arguments. These
//! transactions expose a sender setter and a raw `serialize`, but no
//! serialization accessor; the signing delegate wraps them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use storage_core::{BlobAttributes, SigningError, StorageReservation, TransactionObject};

/// Storage-system call carried by a [`WalrusTransaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalrusCall {
    /// `system::reserve_space`
    ReserveSpace { size_bytes: u64, epochs: u64 },
    /// `system::register_blob`
    RegisterBlob {
        /// Hex SHA-256 of the blob bytes
        digest: String,
        size_bytes: u64,
        epochs: u64,
        deletable: bool,
        attributes: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalrusTransaction {
    /// Network the transaction targets (e.g. "testnet")
    pub network: String,
    pub call: WalrusCall,
    /// Address that receives the resulting object
    pub owner: String,
    pub sender: Option<String>,
}

impl WalrusTransaction {
    pub fn reserve_space(network: &str, reservation: &StorageReservation) -> Self {
        Self {
            network: network.to_string(),
            call: WalrusCall::ReserveSpace {
                size_bytes: reservation.size_bytes,
                epochs: reservation.epochs,
            },
            owner: reservation.owner.clone(),
            sender: None,
        }
    }

    pub fn register_blob(
        network: &str,
        blob: &[u8],
        epochs: u64,
        deletable: bool,
        owner: &str,
        attributes: &BlobAttributes,
    ) -> Self {
        Self {
            network: network.to_string(),
            call: WalrusCall::RegisterBlob {
                digest: hex::encode(Sha256::digest(blob)),
                size_bytes: blob.len() as u64,
                epochs,
                deletable,
                attributes: attributes.to_map(),
            },
            owner: owner.to_string(),
            sender: None,
        }
    }

    pub fn to_bcs(&self) -> Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(self)
    }

    pub fn from_bcs(bytes: &[u8]) -> Result<Self, SigningError> {
        bcs::from_bytes(bytes)
            .map_err(|e| SigningError::Decode(format!("BCS decoding failed: {}", e)))
    }
}

impl TransactionObject for WalrusTransaction {
    fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    fn has_sender_setter(&self) -> bool {
        true
    }

    fn set_sender(&mut self, sender: &str) {
        self.sender = Some(sender.to_string());
    }

    fn serialize(&self) -> Option<Vec<u8>> {
        self.to_bcs().ok()
    }
}
