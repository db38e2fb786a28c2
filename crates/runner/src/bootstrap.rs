//! Bootstrap - configuration loading and logging setup
//!
//! The embedded default configuration is used unless `SPREADFLIP_CONFIG`
//! names a JSON file.

use serde::{Deserialize, Serialize};
use spreadflip_core::ProductId;
use spreadflip_order_manager::FlipConfig;
use spreadflip_strategy::BookConfig;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "SPREADFLIP_CONFIG";

fn default_channels() -> Vec<String> {
    ["heartbeat", "level2", "ticker"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Market data feed connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    pub product: ProductId,
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
    /// Bounded event channel between the socket reader and the agent
    pub channel_capacity: usize,
    pub reconnect_delay_secs: u64,
}

impl FeedConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub feed: FeedConfig,
    #[serde(default)]
    pub book: BookConfig,
    #[serde(default)]
    pub flip: FlipConfig,
    pub report_interval_secs: u64,
}

impl RunnerConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed.url.is_empty() {
            return Err(ConfigError::Invalid("feed.url is empty".to_string()));
        }
        if self.feed.product.as_str().is_empty() {
            return Err(ConfigError::Invalid("feed.product is empty".to_string()));
        }
        if self.feed.channel_capacity == 0 {
            return Err(ConfigError::Invalid(
                "feed.channel_capacity must be at least 1".to_string(),
            ));
        }
        if !self.book.max_price.is_positive() {
            return Err(ConfigError::Invalid(format!(
                "book.max_price must be positive, got {}",
                self.book.max_price
            )));
        }
        if self.report_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "report_interval_secs must be at least 1".to_string(),
            ));
        }
        self.flip.validate()?;
        Ok(())
    }
}

/// Load configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunnerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<RunnerConfig, ConfigError> {
    let config: RunnerConfig = serde_json::from_str(json)?;
    Ok(config)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<RunnerConfig, ConfigError> {
    load_config_from_str(include_str!("default_config.json"))
}

/// Load from `SPREADFLIP_CONFIG` if set, else the embedded default, and validate
pub fn load_from_env() -> Result<RunnerConfig, ConfigError> {
    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            log::info!("Loading config from {}", Path::new(&path).display());
            load_config(path)?
        }
        None => load_default_config()?,
    };
    config.validate()?;
    Ok(config)
}

/// Initialise `env_logger`, defaulting to `info` when `RUST_LOG` is unset
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
