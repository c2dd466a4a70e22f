use crate::config::types::{Config, FetcherConfig, SearchConfig, UserAgentConfig};
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_user_agent_config(&config.user_agent)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_search_config(&config.search)?;
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> ConfigResult<()> {
    require_positive("request_timeout_secs", config.request_timeout_secs)?;
    require_positive("connect_timeout_secs", config.connect_timeout_secs)?;
    require_positive("cache_ttl_secs", config.cache_ttl_secs)?;

    if let Some(api) = &config.backlinks_api {
        Url::parse(api)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid backlinks_api: {}", e)))?;
    }

    validate_article_pattern(&config.article_pattern)
}

fn validate_search_config(config: &SearchConfig) -> ConfigResult<()> {
    require_positive("max_duration_secs", config.max_duration_secs)?;
    require_positive("retention_secs", config.retention_secs)?;
    require_positive("log_capacity", config.log_capacity as u64)
}

/// Rejects zero for durations and capacities
fn require_positive(field: &str, value: u64) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::Validation(format!("{} must be >= 1", field)));
    }
    Ok(())
}

/// Article patterns must compile and be anchored at both ends
fn validate_article_pattern(pattern: &str) -> ConfigResult<()> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "article_pattern cannot be empty".to_string(),
        ));
    }

    if !pattern.starts_with('^') || !pattern.ends_with('$') {
        return Err(ConfigError::InvalidPattern(format!(
            "article_pattern must be anchored with ^ and $, got '{}'",
            pattern
        )));
    }

    Regex::new(pattern)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidPattern(e.to_string()))
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    Ok(())
}
