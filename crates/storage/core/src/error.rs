//! Error taxonomy for the upload pipeline.
//!
//! Collaborator errors are classified when they are produced, so callers can
//! match on variants instead of parsing messages. Diagnostics (HTTP status and
//! body, collaborator messages) are always carried in the `Display` output.

use std::time::Duration;

use thiserror::Error;

/// Transport layer errors (after the configured retries are exhausted).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Signing capability errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    #[error("Signing capability rejected the transaction: {0}")]
    Rejected(String),

    #[error("signing capability returned no result")]
    NoResult,

    #[error("Failed to decode transaction bytes: {0}")]
    Decode(String),
}

/// Addressing errors raised when no identifier is available for a URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressingError {
    #[error("Missing object ID, cannot build aggregator URL")]
    MissingObjectId,
}

/// Errors surfaced by the storage network collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Client state is stale; reset the client and retry the whole operation.
    #[error("Retryable client error: {0}")]
    RetryableClient(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("Storage network rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed storage network response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn is_retryable_client(&self) -> bool {
        matches!(self, NetworkError::RetryableClient(_))
    }
}

/// Classified errors returned by the upload orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("Transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Blob transfer incomplete: {0}")]
    Transfer(String),

    #[error("Addressing failed: {0}")]
    Addressing(#[from] AddressingError),

    #[error("Storage client kept failing after {attempts} resets: {message}")]
    RetryableClient { attempts: u32, message: String },

    #[error("Storage network error: {0}")]
    Storage(String),
}

impl From<NetworkError> for UploadError {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::Transport(e) => UploadError::Transport(e),
            NetworkError::Signing(e) => UploadError::Signing(e),
            NetworkError::RetryableClient(message) => UploadError::RetryableClient {
                attempts: 0,
                message,
            },
            NetworkError::Rejected(msg) | NetworkError::InvalidResponse(msg) => {
                UploadError::Storage(msg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_keeps_status_and_body() {
        let err = TransportError::Status {
            status: 503,
            body: "storage node overloaded".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "HTTP 503: storage node overloaded");

        let upload: UploadError = NetworkError::from(err).into();
        assert!(upload.to_string().contains("storage node overloaded"));
        assert!(matches!(upload, UploadError::Transport(_)));
    }

    #[test]
    fn test_no_result_message() {
        let upload = UploadError::from(SigningError::NoResult);
        assert_eq!(
            upload.to_string(),
            "Signing failed: signing capability returned no result"
        );
    }

    #[test]
    fn test_network_error_classification() {
        assert!(NetworkError::RetryableClient("epoch changed".into()).is_retryable_client());
        assert!(!NetworkError::Rejected("nope".into()).is_retryable_client());
        assert_eq!(
            UploadError::from(NetworkError::Rejected("quota".into())),
            UploadError::Storage("quota".into())
        );
    }
}
