use crate::browser::{InterceptionPolicy, WaitUntil};
use crate::config::types::{BrowserConfig, Config, CrawlerConfig, OutputConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    validate_output_config(&config.output)?;
    validate_retry_config(&config.retry)?;
    Ok(())
}

/// Validates catalogue traversal configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("base_url", &config.base_url)?;
    validate_http_url("catalogue_url", &config.catalogue_url)?;

    if !config.page_path_template.contains("{n}") {
        return Err(ConfigError::Validation(format!(
            "page_path_template must contain the '{{n}}' placeholder, got '{}'",
            config.page_path_template
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.navigation_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_ms must be >= 1000ms, got {}ms",
            config.navigation_timeout_ms
        )));
    }

    config
        .wait_until
        .parse::<WaitUntil>()
        .map_err(ConfigError::Validation)?;

    InterceptionPolicy::from_names(&config.blocked_resources).map_err(ConfigError::Validation)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.data_dir.is_empty() {
        return Err(ConfigError::Validation(
            "data_dir cannot be empty".to_string(),
        ));
    }

    if config.books_subdir.is_empty() {
        return Err(ConfigError::Validation(
            "books_subdir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Upper bound on re-attempts of a single page
const MAX_RETRIES: u32 = 10;

/// Upper bound on the growth factor between two retry delays
const MAX_BACKOFF_MULTIPLIER: f64 = 10.0;

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if !config.backoff_multiplier.is_finite()
        || config.backoff_multiplier < 1.0
        || config.backoff_multiplier > MAX_BACKOFF_MULTIPLIER
    {
        return Err(ConfigError::Validation(format!(
            "backoff_multiplier must be between 1.0 and {}, got {}",
            MAX_BACKOFF_MULTIPLIER, config.backoff_multiplier
        )));
    }

    if config.max_retries > MAX_RETRIES {
        return Err(ConfigError::Validation(format!(
            "max_retries must be at most {}, got {}",
            MAX_RETRIES, config.max_retries
        )));
    }

    Ok(())
}

/// Checks that a configured URL parses and uses HTTP(S)
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            field, value
        )));
    }

    Ok(())
}
