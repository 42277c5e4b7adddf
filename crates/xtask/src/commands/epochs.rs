//! Retention → epochs conversion.

use anyhow::{Result, bail};
use clap::Parser;
use console::style;
use storage_core::{RetentionPeriod, SECONDS_PER_EPOCH};

/// Convert a retention period into storage epochs
#[derive(Parser, Debug)]
pub struct Epochs {
    /// Retention in days
    #[arg(long, conflicts_with = "seconds")]
    pub days: Option<u64>,

    /// Retention in seconds
    #[arg(long)]
    pub seconds: Option<u64>,
}

impl Epochs {
    pub fn execute(self) -> Result<()> {
        let retention = match (self.days, self.seconds) {
            (Some(days), _) => RetentionPeriod::from_days(days),
            (None, Some(seconds)) => RetentionPeriod::from_seconds(seconds),
            (None, None) => bail!("Specify --days or --seconds"),
        };

        println!(
            "{} {}s → {} epochs ({}s per epoch)",
            style("Retention:").bold().cyan(),
            retention.requested_seconds,
            style(retention.epochs()).green().bold(),
            SECONDS_PER_EPOCH
        );

        Ok(())
    }
}
