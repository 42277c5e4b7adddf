//! Storage abstraction layer for Walrus content uploads.
//!
//! This crate owns the data model and the collaborator seams used by the
//! upload pipeline. It performs no I/O of its own (except reading a local
//! file into a [`ContentBlob`]).
//!
//! # Architecture
//!
//! ```text
//! Caller
//!   │  ContentBlob + RetentionPeriod + &dyn SigningCapability
//!   ▼
//! UploadOrchestrator (storage-walrus)
//!   ├── SigningCapability   (wallet, untrusted timing)
//!   ├── StorageNetwork      (publisher / SDK collaborator)
//!   └── TransactionSigner   (adapter handed to the blob write)
//!   ▼
//! ContentDescriptor { url, blob_id, storage_source }
//! ```
//!
//! # Design Philosophy
//!
//! - **Types** describe values that cross the seams and are immutable once built.
//! - **Traits** describe collaborators; their errors are classified up front so
//!   the orchestrator never has to inspect message text.

pub mod error;
pub mod traits;
pub mod transaction;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export all traits
pub use traits::{SigningCapability, StorageNetwork, TransactionDecoder, TransactionSigner};

// Re-export all errors
pub use error::{AddressingError, NetworkError, SigningError, TransportError, UploadError};

// Re-export transaction shapes
pub use transaction::{
    RawTransaction, SerializableTransaction, SignableRequest, SignedTransaction, TransactionObject,
    TransactionPayload, TransactionShape,
};

// Re-export all types
pub use types::{
    BlobAttributes, BlobRecord, ContentBlob, ContentDescriptor, MediaKind, RetentionPeriod,
    SECONDS_PER_EPOCH, StorageReservation, StorageSource, UploadProgress, UploadStage,
    WriteBlobOutcome, WriteBlobRequest,
};

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockSigner, MockStorageNetwork, MockTransaction, SignBehavior};
