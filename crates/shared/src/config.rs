//! Configuration management for the MediaWiki API client.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default User-Agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!(
    "mediawiki-api/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/lehinevych/MediaWikiAPI/)"
);

/// Endpoint template, `{lang}` is replaced by the active language code
pub const DEFAULT_API_URL: &str = "https://{lang}.wikipedia.org/w/api.php";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// MediaWiki client settings
    #[serde(default)]
    pub mediawiki: MediaWikiConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory path
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// MediaWiki client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaWikiConfig {
    /// Language prefix of the wiki to query (e.g. "en", "fr")
    pub language: String,

    /// User-Agent header value
    pub user_agent: String,

    /// API endpoint template
    pub api_url: String,

    /// HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum number of redirect hops followed while resolving a page
    pub max_redirects: u32,

    /// Memoize search, geosearch, suggest and summary results
    pub memoize: bool,

    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enforce a minimum delay between consecutive requests
    pub enabled: bool,

    /// Minimum delay between requests in milliseconds
    pub min_wait_ms: u64,
}

impl RateLimitConfig {
    /// The minimum wait, or `None` when rate limiting is disabled
    pub fn min_wait(&self) -> Option<Duration> {
        self.enabled.then(|| Duration::from_millis(self.min_wait_ms))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            default_level: "info".to_string(),
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_wait_ms: 50,
        }
    }
}

impl Default for MediaWikiConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_seconds: 30,
            max_redirects: 10,
            memoize: true,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            mediawiki: MediaWikiConfig::default(),
        }
    }
}

impl MediaWikiConfig {
    /// HTTP timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }
}
