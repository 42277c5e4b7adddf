//! Blob addressing: object ID → retrieval URL.

use storage_core::AddressingError;

use crate::config::{StorageEnvironment, WalrusConfig};

/// Maps storage identifiers to retrieval URLs.
///
/// Pure: the result depends only on the identifier and the base URL chosen
/// when the resolver was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUrlResolver {
    aggregator_base_url: String,
    environment: StorageEnvironment,
}

impl BlobUrlResolver {
    pub fn new(aggregator_base_url: impl Into<String>, environment: StorageEnvironment) -> Self {
        Self {
            aggregator_base_url: aggregator_base_url.into(),
            environment,
        }
    }

    pub fn from_config(config: &WalrusConfig) -> Self {
        Self::new(config.aggregator_base_url(), config.environment)
    }

    pub fn aggregator_base_url(&self) -> &str {
        &self.aggregator_base_url
    }

    /// `aggregator_base_url + object_id`, concatenated as-is.
    pub fn resolve_url(&self, object_id: Option<&str>) -> Result<String, AddressingError> {
        match object_id {
            Some(id) if !id.is_empty() => Ok(format!("{}{}", self.aggregator_base_url, id)),
            _ => Err(AddressingError::MissingObjectId),
        }
    }

    /// Fallback URL for a blob whose object ID is unknown.
    ///
    /// Served by the public Walrus site portal, not the configured aggregator.
    pub fn blob_fallback_url(&self, blob_id: &str) -> String {
        format!("https://{}.walrus.app/blob/{}", self.environment.as_str(), blob_id)
    }
}
