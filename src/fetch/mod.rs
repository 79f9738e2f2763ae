//! Page fetching for Site-Harvester
//!
//! This module retrieves one page's raw content in one of two modes:
//! - `Static`: a single HTTP GET with polite headers, following redirects
//! - `Rendered`: a headless-browser render (requires the `browser` feature)
//!
//! Both modes sit behind the [`PageFetcher`] trait so the crawler never knows
//! which one it is driving. Transient failures are retried according to a
//! [`RetryPolicy`] built from the configured `max-retries`.

#[cfg(feature = "browser")]
mod browser;
mod http;

#[cfg(feature = "browser")]
pub use browser::{BrowserPool, PageLease, RenderedFetcher};
pub use http::{build_http_client, StaticFetcher};

use crate::config::FetchConfig;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Upper bound on a single retry delay
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// How a page is retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Plain HTTP request/response, no script execution
    Static,
    /// Headless browser render, scripts executed before capture
    Rendered,
}

impl FetchMode {
    pub fn from_render_flag(render: bool) -> Self {
        if render {
            Self::Rendered
        } else {
            Self::Static
        }
    }
}

/// One fetch attempt's parameters
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// The URL to fetch
    pub url: Url,

    /// Static or rendered retrieval
    pub mode: FetchMode,

    /// Upper bound for this fetch
    pub timeout: Duration,

    /// Extra settle time after a rendered page goes idle (ignored for static)
    pub wait: Duration,
}

impl FetchRequest {
    pub fn new(url: Url, mode: FetchMode, timeout: Duration, wait: Duration) -> Self {
        Self {
            url,
            mode,
            timeout,
            wait,
        }
    }
}

/// Raw result of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: Url,

    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code (rendered mode reports 200)
    pub status_code: u16,

    /// Content-Type header value
    pub content_type: String,

    /// Page markup
    pub body: String,

    /// Title reported by the browser, if the fetch mode knows it
    pub title: Option<String>,
}

/// Something that can retrieve a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one page, failing on transport errors, non-2xx status or timeout
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage>;

    /// Releases long-lived resources (browser processes, pools)
    async fn shutdown(&self) {}
}

/// Retry behavior for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,

    /// Delay before the first retry, doubled per further retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Delay before retry number `attempt` (0-indexed)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

/// Fetches a page, retrying transient failures with exponential backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 2xx | Return page |
/// | HTTP 5xx / 429 | Retry up to `max_retries` times |
/// | Timeout | Retry up to `max_retries` times |
/// | Connection refused | Retry up to `max_retries` times |
/// | Other HTTP 4xx | Fail immediately |
/// | Browser failure | Fail immediately |
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    request: &FetchRequest,
    policy: RetryPolicy,
) -> FetchResult<FetchedPage> {
    let mut attempt = 0;

    loop {
        match fetcher.fetch(request).await {
            Ok(page) => return Ok(page),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    "Fetch of {} failed ({}), retry {}/{} in {:?}",
                    request.url,
                    e,
                    attempt + 1,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetcher used when rendered mode is requested but no browser is available
#[cfg_attr(feature = "browser", allow(dead_code))]
pub(crate) struct UnavailableRenderer;

#[async_trait]
impl PageFetcher for UnavailableRenderer {
    async fn fetch(&self, _request: &FetchRequest) -> FetchResult<FetchedPage> {
        Err(FetchError::RenderingUnavailable)
    }
}
