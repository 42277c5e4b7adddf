//! Publisher response types.
//!
//! Most fields are `Option<T>` or `#[serde(default)]`, and unknown fields land
//! in `extra`, so new or nullable publisher fields do not break parsing. Only
//! `blob_id` (and `id` for new blob objects) is required.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use storage_core::WriteBlobOutcome;

/// Response from `PUT /v1/blobs`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BlobResponse {
    /// Blob was newly registered and certified
    NewlyCreated(Box<NewlyCreatedBlob>),
    /// Blob was already certified; the publisher did not create an object
    AlreadyCertified(CertifiedBlob),
}

impl BlobResponse {
    pub fn blob_id(&self) -> &str {
        match self {
            BlobResponse::NewlyCreated(info) => &info.blob_object.blob_id,
            BlobResponse::AlreadyCertified(info) => &info.blob_id,
        }
    }

    /// Sui object ID, when the response carries one.
    pub fn object_id(&self) -> Option<&str> {
        match self {
            BlobResponse::NewlyCreated(info) => Some(&info.blob_object.id),
            BlobResponse::AlreadyCertified(info) => info.object.as_deref(),
        }
    }

    pub fn into_outcome(self) -> WriteBlobOutcome {
        WriteBlobOutcome {
            object_id: self.object_id().map(str::to_string),
            blob_id: Some(self.blob_id().to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewlyCreatedBlob {
    pub blob_object: BlobObject,

    /// Storage cost in FROST
    #[serde(default)]
    pub cost: u64,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedBlob {
    pub blob_id: String,

    /// Present when the existing blob object is owned by the requester
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,

    #[serde(default)]
    pub end_epoch: u64,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Walrus blob object (stored on Sui).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobObject {
    /// Sui object ID
    pub id: String,

    /// Walrus blob ID (content-addressed, URL-safe base64)
    pub blob_id: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_epoch: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certified_epoch: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageInfo>,

    #[serde(default)]
    pub deletable: bool,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub start_epoch: u64,

    #[serde(default)]
    pub end_epoch: u64,

    #[serde(default)]
    pub storage_size: u64,

    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newly_created_carries_object_id() {
        let json = r#"{
            "newlyCreated": {
                "blobObject": {
                    "id": "0xo1",
                    "registeredEpoch": 34,
                    "blobId": "b1",
                    "size": 2048,
                    "encodingType": "RS2",
                    "certifiedEpoch": null,
                    "storage": { "id": "0xs1", "startEpoch": 34, "endEpoch": 399, "storageSize": 66034000 },
                    "deletable": true
                },
                "resourceOperation": { "registerFromScratch": { "encodedLength": 66034000, "epochsAhead": 365 } },
                "cost": 132300
            }
        }"#;

        let response: BlobResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.blob_id(), "b1");
        assert_eq!(response.object_id(), Some("0xo1"));

        let BlobResponse::NewlyCreated(info) = &response else {
            panic!("expected newlyCreated");
        };
        assert!(info.extra.contains_key("resourceOperation"));
        assert_eq!(info.blob_object.storage.as_ref().unwrap().end_epoch, 399);
    }

    #[test]
    fn test_already_certified_without_object() {
        let json = r#"{
            "alreadyCertified": {
                "blobId": "b2",
                "event": { "txDigest": "4XQ", "eventSeq": "0" },
                "endEpoch": 120
            }
        }"#;

        let outcome = serde_json::from_str::<BlobResponse>(json)
            .unwrap()
            .into_outcome();
        assert_eq!(outcome.blob_id.as_deref(), Some("b2"));
        assert_eq!(outcome.object_id, None);
    }
}
