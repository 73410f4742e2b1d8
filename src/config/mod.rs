//! Configuration module for hostcrawl
//!
//! This module handles loading, layering, and validating configuration.
//! Values come from an optional TOML file, then `HOSTCRAWL_*` environment
//! variables, then command-line flags.
//!
//! # Example
//!
//! ```no_run
//! use hostcrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hostcrawl.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.root_url, config.crawler.workers);
//! ```

mod env;
mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, LedgerBackend, LedgerConfig, UserAgentConfig, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_WORKERS,
};

// Re-export parser functions
pub use env::{apply_env_overrides, apply_overrides_with, ENV_ROOT_URL, ENV_WORKERS};
pub use parser::{compute_config_hash, load_config, parse_config};
pub use validation::{validate, MAX_WORKERS};
