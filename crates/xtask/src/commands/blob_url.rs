//! Object ID → retrieval URL.

use anyhow::Result;
use clap::Parser;
use storage_walrus::BlobUrlResolver;

use super::load_config;

/// Resolve an object ID into a retrieval URL
#[derive(Parser, Debug)]
pub struct BlobUrl {
    /// Sui object ID of the blob
    pub object_id: Option<String>,

    /// Blob ID, used for the fallback URL when no object ID is given
    #[arg(long)]
    pub blob_id: Option<String>,
}

impl BlobUrl {
    pub fn execute(self) -> Result<()> {
        let resolver = BlobUrlResolver::from_config(&load_config()?);

        let url = match (resolver.resolve_url(self.object_id.as_deref()), &self.blob_id) {
            (Ok(url), _) => url,
            (Err(_), Some(blob_id)) => resolver.blob_fallback_url(blob_id),
            (Err(err), None) => return Err(err.into()),
        };

        println!("{}", url);
        Ok(())
    }
}
