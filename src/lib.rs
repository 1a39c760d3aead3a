//! Shelf-Crawler: a paginated catalogue crawler
//!
//! This crate walks the list pages of a product catalogue, visits the detail
//! page of every listed item, extracts structured records from the rendered
//! HTML and writes them out as JSON artifacts.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod records;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Cannot join '{input}' onto '{base}': {reason}")]
    Join {
        input: String,
        base: String,
        reason: String,
    },

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for Shelf-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use records::{BookEntry, DetailRecord, FetchFailure, MergedRecord, RunResult, SummaryRecord};
pub use url::{resolve_url, slugify};
