use crate::config::types::{Config, CrawlerConfig, LedgerBackend, LedgerConfig, UserAgentConfig};
use crate::url::parse_root_url;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Largest accepted worker pool
pub const MAX_WORKERS: u32 = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_ledger_config(&config.ledger)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.root_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "root_url must be set (config file, HOSTCRAWL_ROOT_URL or --url)".to_string(),
        ));
    }

    parse_root_url(&config.root_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid root_url '{}': {}", config.root_url, e))
    })?;

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        Url::parse(contact_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates ledger configuration
fn validate_ledger_config(config: &LedgerConfig) -> ConfigResult<()> {
    match config.backend {
        LedgerBackend::Memory => Ok(()),
        LedgerBackend::File | LedgerBackend::Sqlite => {
            if config.path.as_deref().map_or(true, |p| p.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "ledger backend '{}' requires a path",
                    config.backend.as_str()
                )));
            }
            Ok(())
        }
    }
}
