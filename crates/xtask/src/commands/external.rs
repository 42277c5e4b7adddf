//! Describe externally hosted content.

use anyhow::Result;
use clap::Parser;
use storage_walrus::ContentResolver;

/// Describe externally hosted content
#[derive(Parser, Debug)]
pub struct External {
    /// Content URL (used as-is)
    pub url: String,
}

impl External {
    pub fn execute(self) -> Result<()> {
        let descriptor = ContentResolver::external(self.url)?;

        let mut json = serde_json::to_value(&descriptor)?;
        json["mediaKind"] = serde_json::to_value(descriptor.media_kind())?;
        println!("{}", serde_json::to_string_pretty(&json)?);

        Ok(())
    }
}
