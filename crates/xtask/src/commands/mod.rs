//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod blob_url;
mod config;
mod epochs;
mod external;
mod read_blob;
mod upload;

pub use blob_url::BlobUrl;
pub use config::ShowConfig;
pub use epochs::Epochs;
pub use external::External;
pub use read_blob::ReadBlob;
pub use upload::Upload;

use anyhow::{Context, Result};
use storage_walrus::WalrusConfig;

/// Load and validate the storage configuration.
fn load_config() -> Result<WalrusConfig> {
    WalrusConfig::from_env().context("Failed to load storage configuration")
}
