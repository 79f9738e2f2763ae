//! Configuration module for Site-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering environment overrides (`USER_AGENT`, `REQUEST_TIMEOUT`,
//! `MAX_RETRIES`, `HARVEST_DATABASE`) on top.
//!
//! # Example
//!
//! ```no_run
//! use site_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvester.toml")).unwrap();
//! println!("Fetch timeout: {}s", config.fetch.timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, CrawlConfig, FetchConfig, HarvesterConfig, StorageConfig};

// Re-export parser functions
pub use parser::{apply_env_overrides, apply_overrides, load_config, load_config_or_default};
pub use validation::validate;
