//! Walrus upload pipeline.
//!
//! Publishes binary content to Walrus and returns a retrieval URL, while all
//! signing is delegated to an external
//! [`SigningCapability`](storage_core::SigningCapability).
//!
//! # Architecture
//!
//! ```text
//! ContentResolver ── External ──────────────────────────┐
//!        │ Managed                                      │
//!        ▼                                              ▼
//! UploadOrchestrator ─┬─ SigningDelegate ─→ wallet   ContentDescriptor
//!        │            └─ StorageNetwork (WalrusHttpNetwork → RetryableTransport)
//!        ▼
//! BlobUrlResolver ─→ ContentDescriptor
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use storage_walrus::{ProgressSink, UploadOrchestrator, WalrusConfig};
//!
//! let config = WalrusConfig::from_env()?;
//! let orchestrator = UploadOrchestrator::from_config(&config);
//!
//! let blob = ContentBlob::from_path("ad.png").await?;
//! let descriptor = orchestrator
//!     .upload(blob, RetentionPeriod::from_days(30), address, &wallet, &ProgressSink::disabled())
//!     .await?;
//! ```

pub mod config;
pub mod content;
pub mod orchestrator;
pub mod progress;
pub mod resolver;
pub mod signer;
pub mod transport;
pub mod walrus;

pub use config::{ConfigError, Network, StorageEnvironment, TransportConfig, WalrusConfig};
pub use content::{ContentRequest, ContentResolver, ManagedUpload};
pub use orchestrator::{OrchestratorOptions, UploadOrchestrator, UploadState};
pub use progress::{ProgressSink, progress_channel};
pub use resolver::BlobUrlResolver;
pub use signer::SigningDelegate;
pub use transport::{HttpResponse, RetryableTransport};
pub use walrus::WalrusHttpNetwork;
