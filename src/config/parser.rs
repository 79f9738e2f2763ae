use crate::config::types::HarvesterConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use std::str::FromStr;

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(HarvesterConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<HarvesterConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: HarvesterConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config)?;

    validate(&config)?;

    Ok(config)
}

/// Loads the configuration file if one is given, otherwise starts from defaults
///
/// Environment overrides and validation apply either way.
pub fn load_config_or_default(path: Option<&Path>) -> Result<HarvesterConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = HarvesterConfig::default();
            apply_env_overrides(&mut config)?;
            validate(&config)?;
            Ok(config)
        }
    }
}

/// Applies overrides from the process environment
pub fn apply_env_overrides(config: &mut HarvesterConfig) -> Result<(), ConfigError> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Applies overrides from an arbitrary variable lookup
///
/// | Variable | Field |
/// |----------|-------|
/// | `USER_AGENT` | `fetch.user-agent` |
/// | `REQUEST_TIMEOUT` | `fetch.timeout-secs` |
/// | `MAX_RETRIES` | `fetch.max-retries` |
/// | `HARVEST_DATABASE` | `storage.database-path` |
pub fn apply_overrides<F>(config: &mut HarvesterConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(user_agent) = lookup("USER_AGENT") {
        config.fetch.user_agent = user_agent;
    }

    if let Some(value) = lookup("REQUEST_TIMEOUT") {
        config.fetch.timeout_secs = parse_env("REQUEST_TIMEOUT", &value)?;
    }

    if let Some(value) = lookup("MAX_RETRIES") {
        config.fetch.max_retries = parse_env("MAX_RETRIES", &value)?;
    }

    if let Some(path) = lookup("HARVEST_DATABASE") {
        if !path.trim().is_empty() {
            config.storage.database_path = Some(path);
        }
    }

    Ok(())
}

fn parse_env<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name: name.to_string(),
        value: value.to_string(),
    })
}
