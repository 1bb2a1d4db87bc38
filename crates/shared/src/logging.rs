//! Logging infrastructure for the MediaWiki API client.
//!
//! This module provides structured logging with an optional rotating log file,
//! contextual fields and module-specific log levels.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use std::str::FromStr;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            component: "mediawiki-api".to_string(),
            default_level: Level::INFO,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build a [`LogConfig`] from the `[logging]` section of the config file
    ///
    /// An unparseable level falls back to `info`.
    pub fn from_settings(component: &str, settings: &LoggingConfig) -> Self {
        Self {
            log_dir: settings.log_dir.clone(),
            component: component.to_string(),
            default_level: Level::from_str(&settings.default_level).unwrap_or(Level::INFO),
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        }
    }

    fn filter_directives(&self) -> String {
        let crate_name = self.component.replace('-', "_");
        format!(
            "{}={},shared={},mediawiki_api={},hyper=warn,reqwest=warn,h2=warn,html5ever=warn,selectors=warn",
            crate_name, self.default_level, self.default_level, self.default_level
        )
    }
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Optional daily-rotated file output
/// - Structured logging with contextual fields
/// - Module-specific log levels
/// - Optional JSON formatting
pub fn init(config: LogConfig) -> Result<()> {
    // Default to configured level, but allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let mut layers = Vec::new();

    // Console output goes to stderr so command output stays clean on stdout
    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    if config.file {
        let log_dir = Path::new(&config.log_dir);
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        log_dir = %config.log_dir,
        file = config.file,
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config() {
        let config = LogConfig::default();
        assert_eq!(config.component, "mediawiki-api");
        assert_eq!(config.default_level, Level::INFO);
        assert!(config.console);
        assert!(!config.file);
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingConfig {
            log_dir: "/tmp/wiki-logs".to_string(),
            default_level: "debug".to_string(),
            console: false,
            file: true,
            json_format: true,
        };

        let config = LogConfig::from_settings("mediawiki-api", &settings);
        assert_eq!(config.default_level, Level::DEBUG);
        assert_eq!(config.log_dir, "/tmp/wiki-logs");
        assert!(config.file);
        assert!(config.json_format);
    }

    #[test]
    fn test_unknown_level_falls_back_to_info() {
        let settings = LoggingConfig {
            default_level: "chatty".to_string(),
            ..LoggingConfig::default()
        };

        let config = LogConfig::from_settings("mediawiki-api", &settings);
        assert_eq!(config.default_level, Level::INFO);
    }

    #[test]
    fn test_filter_directives_use_crate_names() {
        let config = LogConfig {
            default_level: Level::DEBUG,
            ..LogConfig::default()
        };

        let directives = config.filter_directives();
        assert!(directives.starts_with("mediawiki_api=DEBUG"));
        assert!(directives.contains("reqwest=warn"));
    }
}
