//! Development tasks for the Walrus upload pipeline
//!
//! This binary provides development utilities using the cargo-xtask pattern.
//! Run with: `cargo xtask <command>`

mod commands;
mod signer;

use anyhow::Result;
use clap::Parser;
use commands::{BlobUrl, Epochs, External, ReadBlob, ShowConfig, Upload};

/// Development tasks for the Walrus upload pipeline
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development tools for Walrus uploads", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Show the storage configuration loaded from the environment
    Config(ShowConfig),

    /// Convert a retention period into storage epochs
    Epochs(Epochs),

    /// Resolve an object ID into a retrieval URL
    BlobUrl(BlobUrl),

    /// Download a blob by blob ID
    ReadBlob(ReadBlob),

    /// Describe externally hosted content
    External(External),

    /// Upload a file, signing through an external command
    Upload(Upload),
}

fn main() -> Result<()> {
    // Load .env file if it exists (STORAGE_ENVIRONMENT and friends)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Config(cmd) => cmd.execute(),
        Command::Epochs(cmd) => cmd.execute(),
        Command::BlobUrl(cmd) => cmd.execute(),
        Command::ReadBlob(cmd) => cmd.execute(),
        Command::External(cmd) => cmd.execute(),
        Command::Upload(cmd) => cmd.execute(),
    }
}
