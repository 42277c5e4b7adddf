//! Upload a file through the full pipeline.
//!
//! Signing is delegated to an external command (see [`CommandSigner`]), so a
//! wallet CLI or a test script can stand in for the browser wallet.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use storage_core::{ContentBlob, RetentionPeriod, UploadStage};
use storage_walrus::{
    ContentRequest, ContentResolver, ManagedUpload, UploadOrchestrator, progress_channel,
};

use super::load_config;
use crate::signer::CommandSigner;

/// Upload a file, signing through an external command
#[derive(Parser, Debug)]
pub struct Upload {
    /// File to upload
    pub file: PathBuf,

    /// Address that owns the uploaded blob and signs for it
    #[arg(short, long, env = "SIGNER_ADDRESS")]
    pub address: String,

    /// Shell command that signs a request read from stdin
    #[arg(long, env = "SIGNER_CMD")]
    pub signer_cmd: String,

    /// Retention in days (defaults to DEFAULT_RETENTION_DAYS)
    #[arg(long)]
    pub days: Option<u64>,
}

impl Upload {
    pub fn execute(self) -> Result<()> {
        tokio::runtime::Runtime::new()?.block_on(self.execute_async())
    }

    async fn execute_async(self) -> Result<()> {
        let config = load_config()?;
        let orchestrator = UploadOrchestrator::from_config(&config);
        let retention = match self.days {
            Some(days) => RetentionPeriod::from_days(days),
            None => orchestrator.default_retention(),
        };

        let blob = ContentBlob::from_path(&self.file)
            .await
            .with_context(|| format!("Failed to load {}", self.file.display()))?;

        println!("{}", style("📦 Uploading to Walrus").green().bold());
        println!(
            "  File:     {} ({} bytes, {})",
            blob.filename(),
            blob.size_bytes(),
            blob.mime_type()
        );
        println!("  Network:  {}", style(config.environment.as_str()).cyan());
        println!("  Epochs:   {}", retention.epochs());
        println!("  Owner:    {}", style(&self.address).cyan());
        println!();

        let signer = CommandSigner::new(&self.address, &self.signer_cmd);
        let (progress, mut updates) = progress_channel();

        let printer = tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                let label = format!("{:?}", update.stage);
                let label = match update.stage {
                    UploadStage::Completed => style(label).green(),
                    UploadStage::Idle => style(label).red(),
                    _ => style(label).yellow(),
                };
                eprintln!("  [{:>3}%] {}", update.percent, label);
            }
        });

        let resolver = ContentResolver::new(orchestrator.into());
        let result = resolver
            .resolve(
                ContentRequest::Managed(ManagedUpload {
                    blob,
                    retention,
                    caller_address: &self.address,
                    capability: &signer,
                }),
                &progress,
            )
            .await;

        // Closes the channel so the printer drains and exits.
        drop(progress);
        let _ = printer.await;

        let descriptor = result.context("Upload failed")?;

        println!();
        println!("{}", style("✓ Upload complete!").green().bold());
        println!("{}", serde_json::to_string_pretty(&descriptor)?);

        Ok(())
    }
}
