use crate::config::types::{Config, CrawlerConfig, FetcherBackend, FetcherConfig, NotifyConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_search_config(&config.search)?;
    validate_notify_config(&config.notify)?;
    Ok(())
}

/// Validates crawl budgets
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth = 0 is allowed: only the seed page is fetched

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_domains < 1 || config.max_concurrent_domains > 256 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-domains must be between 1 and 256, got {}",
            config.max_concurrent_domains
        )));
    }

    if config.num_results < 1 {
        return Err(ConfigError::Validation(format!(
            "num-results must be >= 1, got {}",
            config.num_results
        )));
    }

    Ok(())
}

/// Validates page fetching settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetcher user-agent cannot be empty".to_string(),
        ));
    }

    if config.page_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "page-timeout-secs must be >= 1, got {}",
            config.page_timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.html_cap < 1 {
        return Err(ConfigError::Validation(
            "html-cap must be >= 1".to_string(),
        ));
    }

    if config.backend == FetcherBackend::Webdriver {
        validate_http_url("webdriver-url", &config.webdriver_url)?;
    }

    Ok(())
}

/// Validates the search endpoint
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    validate_http_url("search endpoint", &config.endpoint)?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "search timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates webhook settings; skipped entirely when notifications are off
fn validate_notify_config(config: &NotifyConfig) -> Result<(), ConfigError> {
    if !config.enabled {
        return Ok(());
    }

    validate_http_url("notify endpoint", &config.endpoint)?;

    if config.secret.is_empty() {
        return Err(ConfigError::Validation(
            "notify secret cannot be empty when notifications are enabled".to_string(),
        ));
    }

    if config.recipient.trim().is_empty() {
        return Err(ConfigError::Validation(
            "notify recipient cannot be empty when notifications are enabled".to_string(),
        ));
    }

    Ok(())
}

/// Checks that a configured URL parses and uses HTTP(S)
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
