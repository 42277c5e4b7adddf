//! Walrus storage configuration.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid URL for {key}: {value}")]
    InvalidUrl { key: &'static str, value: String },

    #[error("Request timeout must be greater than 0")]
    ZeroTimeout,
}

/// Deployment environment the client runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageEnvironment {
    #[default]
    Testnet,
    Mainnet,
    Devnet,
    Localnet,
}

impl StorageEnvironment {
    /// Parse an environment name. Unrecognised or blank values run as testnet.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "testnet" => StorageEnvironment::Testnet,
            "mainnet" => StorageEnvironment::Mainnet,
            "devnet" => StorageEnvironment::Devnet,
            "localnet" => StorageEnvironment::Localnet,
            other => {
                tracing::warn!("Unknown STORAGE_ENVIRONMENT {:?}, using testnet", other);
                StorageEnvironment::Testnet
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageEnvironment::Testnet => "testnet",
            StorageEnvironment::Mainnet => "mainnet",
            StorageEnvironment::Devnet => "devnet",
            StorageEnvironment::Localnet => "localnet",
        }
    }

    /// Walrus network used for this environment.
    ///
    /// Only testnet and mainnet exist; devnet and localnet use testnet.
    pub fn network(&self) -> Network {
        match self {
            StorageEnvironment::Mainnet => Network::Mainnet,
            _ => Network::Testnet,
        }
    }
}

/// Walrus network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    #[default]
    Testnet,
    Mainnet,
}

impl Network {
    /// Publisher endpoint (for storing blobs).
    pub fn publisher_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://publisher.walrus-testnet.walrus.space",
            Network::Mainnet => "https://publisher.walrus-mainnet.walrus.space",
        }
    }

    /// Aggregator endpoint (for retrieving blobs by blob ID).
    pub fn aggregator_url(&self) -> &'static str {
        match self {
            Network::Testnet => "https://aggregator.walrus-testnet.walrus.space",
            Network::Mainnet => "https://aggregator.walrus-mainnet.walrus.space",
        }
    }

    /// Default base URL that object IDs are appended to.
    pub fn object_url_base(&self) -> &'static str {
        match self {
            Network::Testnet => DEFAULT_AGGREGATOR_URL_TESTNET,
            Network::Mainnet => DEFAULT_AGGREGATOR_URL_MAINNET,
        }
    }
}

pub const DEFAULT_AGGREGATOR_URL_TESTNET: &str =
    "https://aggregator.walrus-testnet.walrus.space/v1/blobs/by-object-id/";
pub const DEFAULT_AGGREGATOR_URL_MAINNET: &str =
    "https://walrus.globalstake.io/v1/blobs/by-object-id/";

/// Retry and timeout policy for outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub max_retries: u32,
    /// Fixed delay between attempts (no backoff growth)
    pub retry_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_millis(1_000),
            request_timeout: Duration::from_millis(60_000),
        }
    }
}

/// Walrus client configuration.
#[derive(Debug, Clone)]
pub struct WalrusConfig {
    pub environment: StorageEnvironment,

    /// Object-ID URL base for testnet (also used by devnet/localnet)
    pub aggregator_url_testnet: String,

    /// Object-ID URL base for mainnet
    pub aggregator_url_mainnet: String,

    /// Custom publisher endpoint (overrides network default)
    pub publisher_url: Option<String>,

    /// Custom aggregator endpoint for blob reads (overrides network default)
    pub aggregator_url: Option<String>,

    pub transport: TransportConfig,

    /// Lease length used when the caller does not pick one
    pub default_retention_days: u64,

    /// Value of the `origin` blob attribute
    pub origin: String,
}

impl WalrusConfig {
    pub fn new(environment: StorageEnvironment) -> Self {
        Self {
            environment,
            aggregator_url_testnet: DEFAULT_AGGREGATOR_URL_TESTNET.to_string(),
            aggregator_url_mainnet: DEFAULT_AGGREGATOR_URL_MAINNET.to_string(),
            publisher_url: None,
            aggregator_url: None,
            transport: TransportConfig::default(),
            default_retention_days: 30,
            origin: "unknown".to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `STORAGE_ENVIRONMENT` - testnet, mainnet, devnet, localnet (default and fallback: testnet)
    /// - `AGGREGATOR_URL_TESTNET` - Object-ID URL base for testnet
    /// - `AGGREGATOR_URL_MAINNET` - Object-ID URL base for mainnet
    /// - `PUBLISHER_URL` - Custom publisher endpoint
    /// - `AGGREGATOR_URL` - Custom aggregator endpoint for blob reads
    /// - `MAX_RETRIES` - Retries per request (default: 3)
    /// - `RETRY_DELAY_MS` - Delay between retries (default: 1000)
    /// - `REQUEST_TIMEOUT_MS` - Per-attempt timeout (default: 60000)
    /// - `DEFAULT_RETENTION_DAYS` - Default lease length (default: 30)
    /// - `UPLOAD_ORIGIN` - `origin` attribute on uploaded blobs (default: unknown)
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("STORAGE_ENVIRONMENT") {
            Ok(value) => StorageEnvironment::parse(&value),
            Err(_) => StorageEnvironment::default(),
        };

        let mut config = Self::new(environment);

        if let Ok(url) = env::var("AGGREGATOR_URL_TESTNET") {
            config.aggregator_url_testnet = url;
        }
        if let Ok(url) = env::var("AGGREGATOR_URL_MAINNET") {
            config.aggregator_url_mainnet = url;
        }
        config.publisher_url = env::var("PUBLISHER_URL").ok();
        config.aggregator_url = env::var("AGGREGATOR_URL").ok();

        if let Some(retries) = read_env::<u32>("MAX_RETRIES") {
            config.transport.max_retries = retries;
        }
        if let Some(ms) = read_env::<u64>("RETRY_DELAY_MS") {
            config.transport.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("REQUEST_TIMEOUT_MS") {
            config.transport.request_timeout = Duration::from_millis(ms);
        }
        if let Some(days) = read_env::<u64>("DEFAULT_RETENTION_DAYS") {
            config.default_retention_days = days;
        }
        if let Ok(origin) = env::var("UPLOAD_ORIGIN") {
            config.origin = origin;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_publisher_url(mut self, url: impl Into<String>) -> Self {
        self.publisher_url = Some(url.into());
        self
    }

    pub fn with_aggregator_url(mut self, url: impl Into<String>) -> Self {
        self.aggregator_url = Some(url.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn network(&self) -> Network {
        self.environment.network()
    }

    /// Base URL object IDs are appended to, chosen by environment.
    pub fn aggregator_base_url(&self) -> &str {
        match self.network() {
            Network::Mainnet => &self.aggregator_url_mainnet,
            Network::Testnet => &self.aggregator_url_testnet,
        }
    }

    /// Publisher URL (custom or default for network).
    pub fn get_publisher_url(&self) -> &str {
        self.publisher_url
            .as_deref()
            .unwrap_or_else(|| self.network().publisher_url())
    }

    /// Aggregator URL for blob reads (custom or default for network).
    pub fn get_aggregator_url(&self) -> &str {
        self.aggregator_url
            .as_deref()
            .unwrap_or_else(|| self.network().aggregator_url())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("AGGREGATOR_URL_TESTNET", &self.aggregator_url_testnet)?;
        check_url("AGGREGATOR_URL_MAINNET", &self.aggregator_url_mainnet)?;
        check_url("PUBLISHER_URL", self.get_publisher_url())?;
        check_url("AGGREGATOR_URL", self.get_aggregator_url())?;

        if self.transport.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}

impl Default for WalrusConfig {
    fn default() -> Self {
        Self::new(StorageEnvironment::Testnet)
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl {
            key,
            value: value.to_string(),
        })
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
