use serde::Deserialize;
use std::time::Duration;

/// Default user agent presented by both fetch modes
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Site-Harvester
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvesterConfig {
    pub fetch: FetchConfig,
    pub browser: BrowserConfig,
    pub crawl: CrawlConfig,
    pub storage: StorageConfig,
}

/// Page fetching behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Per-fetch timeout (seconds)
    pub timeout_secs: u64,

    /// Extra attempts after a transient failure
    pub max_retries: u32,

    /// Base delay before the first retry (milliseconds), doubled per attempt
    pub retry_backoff_ms: u64,

    /// Maximum redirect hops followed by a static fetch
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_backoff_ms: 500,
            max_redirects: 10,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Headless browser pool used by rendered fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BrowserConfig {
    /// Maximum pages open at once in the shared browser
    pub pool_size: usize,

    /// Run the browser without a window
    pub headless: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            pool_size: 2,
            headless: true,
        }
    }
}

/// Defaults applied to scrape requests that leave them unset
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Page cap for site-wide crawls
    pub default_max_pages: usize,

    /// Extra wait after the rendered page settles (seconds)
    pub default_wait_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            default_max_pages: 10,
            default_wait_secs: 5,
        }
    }
}

/// Job store location
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// SQLite database path; jobs live in memory when unset
    pub database_path: Option<String>,
}
