//! hostcrawl: a bounded-concurrency, same-host web crawler
//!
//! This crate crawls a site breadth-first from a root page, following only
//! links that stay on the root's host. Work is spread over a fixed pool of
//! workers, visited pages are recorded in a dedup ledger, and the crawl ends
//! deterministically once every discovered page has been processed.

pub mod config;
pub mod crawler;
pub mod output;
pub mod store;
pub mod url;

use thiserror::Error;

/// Main error type for hostcrawl operations
///
/// Every variant is a startup failure: once the crawl is running, per-page
/// problems are logged and counted instead of being returned.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid root URL '{url}': {reason}")]
    InvalidRootUrl { url: String, reason: UrlError },

    #[error("Ledger error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Failed to seed link queue: {0}")]
    Seed(#[from] crawler::PushError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
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
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport};
pub use store::{DedupStore, JsonLedgerStore};
pub use crate::url::{parse_root_url, site_id};
