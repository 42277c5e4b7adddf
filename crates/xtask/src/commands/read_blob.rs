//! Download a blob by blob ID.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use storage_walrus::UploadOrchestrator;

use super::load_config;

/// Download a blob by blob ID
#[derive(Parser, Debug)]
pub struct ReadBlob {
    /// Walrus blob ID
    pub blob_id: String,

    /// Output file (defaults to a byte count summary)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ReadBlob {
    pub fn execute(self) -> Result<()> {
        tokio::runtime::Runtime::new()?.block_on(self.execute_async())
    }

    async fn execute_async(&self) -> Result<()> {
        let orchestrator = UploadOrchestrator::from_config(&load_config()?);

        let bytes = orchestrator
            .read_blob(&self.blob_id)
            .await
            .with_context(|| format!("Failed to read blob {}", self.blob_id))?;

        match &self.output {
            Some(path) => {
                tokio::fs::write(path, &bytes)
                    .await
                    .with_context(|| format!("Failed to write: {}", path.display()))?;
                println!(
                    "{} {} bytes → {}",
                    style("✓").green(),
                    bytes.len(),
                    style(path.display()).dim()
                );
            }
            None => println!(
                "{} Blob {} is {} bytes",
                style("✓").green(),
                style(&self.blob_id).cyan(),
                bytes.len()
            ),
        }

        Ok(())
    }
}
