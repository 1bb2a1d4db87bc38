//! Shared library for the MediaWiki API client workspace.
//!
//! This crate provides common functionality used by the library and its
//! binaries:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{Config, LoggingConfig, MediaWikiConfig, RateLimitConfig};
pub use logging::LogConfig;
