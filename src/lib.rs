//! Site-Harvester: structured extraction for web pages and small sites
//!
//! This crate fetches a page (plain HTTP or a headless browser render), runs it
//! through a pipeline of extractors (metadata, contacts, social links, images,
//! page structure or explicit selectors) and, when asked, walks a bounded,
//! same-host breadth-first crawl that merges every page into one report.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while retrieving a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport {
        url: String,
        message: String,
        connect: bool,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Rendered fetch of {url} failed: {message}")]
    Browser { url: String, message: String },

    #[error("Rendered fetching is not available (build with the `browser` feature)")]
    RenderingUnavailable,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// Returns true if another attempt at the same URL may succeed
    ///
    /// Timeouts, connection failures, HTTP 5xx and HTTP 429 are transient.
    /// Every other failure is permanent for the URL.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport { connect, .. } => *connect,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::Browser { .. } | Self::RenderingUnavailable | Self::Client(_) => false,
        }
    }
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

    #[error("Invalid value for environment variable {name}: '{value}'")]
    InvalidEnv { name: String, value: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Site-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::HarvesterConfig;
pub use crawler::{Coordinator, CrawlResult, PageSummary, ScrapeOutput, ScrapeRequest};
pub use extract::ExtractionResult;
pub use fetch::FetchMode;
pub use self::url::{normalize_url, prepare_target};
