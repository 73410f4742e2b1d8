//! Environment variable overrides
//!
//! Applied after the configuration file and before command-line flags.

use crate::config::types::Config;

/// Overrides `crawler.root-url`
pub const ENV_ROOT_URL: &str = "HOSTCRAWL_ROOT_URL";

/// Overrides `crawler.workers`
pub const ENV_WORKERS: &str = "HOSTCRAWL_WORKERS";

/// Applies overrides from the process environment
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_with(config, |key| std::env::var(key).ok());
}

/// Applies overrides using `lookup` to read variables
///
/// Empty values are ignored. A worker count that does not parse keeps the
/// previous value and logs a warning.
pub fn apply_overrides_with<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(root_url) = lookup(ENV_ROOT_URL).filter(|v| !v.trim().is_empty()) {
        config.crawler.root_url = root_url.trim().to_string();
    }

    if let Some(raw) = lookup(ENV_WORKERS).filter(|v| !v.trim().is_empty()) {
        match raw.trim().parse::<u32>() {
            Ok(workers) => config.crawler.workers = workers,
            Err(_) => tracing::warn!(
                "Invalid integer value for {}: '{}', keeping {}",
                ENV_WORKERS,
                raw,
                config.crawler.workers
            ),
        }
    }
}
