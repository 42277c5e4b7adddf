//! Walrus publisher/aggregator integration.
//!
//! ## Integration Pattern
//!
//! The public HTTP API is used for blob bytes; the wallet signs the
//! on-chain side:
//! 1. Reserve storage space (signed by the caller's wallet)
//! 2. Register the blob digest (signed through the per-request signer)
//! 3. Upload bytes via the publisher → blob ID and Sui object ID
//! 4. Read bytes back via the aggregator by blob ID
//!
//! ## Modules
//!
//! - [`client`]: [`WalrusHttpNetwork`], the `StorageNetwork` implementation
//! - [`transaction`]: BCS-encoded storage transactions
//! - [`types`]: publisher response types

pub mod client;
pub mod transaction;
pub mod types;

pub use client::WalrusHttpNetwork;
pub use transaction::{WalrusCall, WalrusTransaction};
pub use types::{BlobObject, BlobResponse, CertifiedBlob, NewlyCreatedBlob};
