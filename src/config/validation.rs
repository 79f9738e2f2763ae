use crate::config::types::{BrowserConfig, CrawlConfig, FetchConfig, HarvesterConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &HarvesterConfig) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_browser_config(&config.browser)?;
    validate_crawl_config(&config.crawl)?;
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    if config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be <= 10, got {}",
            config.max_retries
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    Ok(())
}

/// Validates browser pool configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > 16 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 16, got {}",
            config.pool_size
        )));
    }

    Ok(())
}

/// Validates crawl defaults
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.default_max_pages < 1 {
        return Err(ConfigError::Validation(
            "default_max_pages must be >= 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&HarvesterConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let mut config = HarvesterConfig::default();
        config.fetch.user_agent = "   ".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_timeout_bounds() {
        let mut config = HarvesterConfig::default();
        config.fetch.timeout_secs = 0;
        assert!(validate(&config).is_err());

        config.fetch.timeout_secs = 601;
        assert!(validate(&config).is_err());

        config.fetch.timeout_secs = 600;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_retry_limit() {
        let mut config = HarvesterConfig::default();
        config.fetch.max_retries = 11;
        assert!(validate(&config).is_err());

        config.fetch.max_retries = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_pool_size_bounds() {
        let mut config = HarvesterConfig::default();
        config.browser.pool_size = 0;
        assert!(validate(&config).is_err());

        config.browser.pool_size = 17;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_page_cap_rejected() {
        let mut config = HarvesterConfig::default();
        config.crawl.default_max_pages = 0;
        assert!(validate(&config).is_err());
    }
}
