//! Show the effective storage configuration.

use anyhow::Result;
use clap::Parser;
use console::style;

use super::load_config;

/// Show the storage configuration loaded from the environment
#[derive(Parser, Debug)]
pub struct ShowConfig;

impl ShowConfig {
    pub fn execute(self) -> Result<()> {
        let config = load_config()?;
        let transport = &config.transport;

        println!("{}", style("=== Storage Configuration ===").bold().green());
        println!();
        println!("{} {}", style("Environment:").bold().cyan(), config.environment.as_str());
        println!("{} {:?}", style("Network:").bold().cyan(), config.network());
        println!("{} {}", style("Publisher:").bold().cyan(), config.get_publisher_url());
        println!("{} {}", style("Aggregator:").bold().cyan(), config.get_aggregator_url());
        println!("{} {}", style("Object URL base:").bold().cyan(), config.aggregator_base_url());
        println!();
        println!("{}", style("Transport:").bold().yellow());
        println!("  Max retries:     {}", transport.max_retries);
        println!("  Retry delay:     {:?}", transport.retry_delay);
        println!("  Request timeout: {:?}", transport.request_timeout);
        println!();
        println!("{}", style("Uploads:").bold().yellow());
        println!("  Default retention: {} days", config.default_retention_days);
        println!("  Origin attribute:  {}", config.origin);

        Ok(())
    }
}
