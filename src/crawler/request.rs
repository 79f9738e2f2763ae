use serde::{Deserialize, Serialize};

/// A caller's scrape request
///
/// Unset `wait_time` and `max_pages` fall back to the `[crawl]` config
/// defaults when the request runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Full URL or bare domain
    pub url: String,

    /// CSS selectors; when present the page uses selector mode
    #[serde(default)]
    pub selectors: Option<Vec<String>>,

    /// Render the page in a headless browser
    #[serde(default, alias = "use_playwright")]
    pub render: bool,

    /// Seconds to wait after a rendered page settles
    #[serde(default)]
    pub wait_time: Option<u64>,

    /// Crawl the whole site (only honored for a root URL)
    #[serde(default)]
    pub crawl_site: bool,

    /// Page cap for a site crawl
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl ScrapeRequest {
    /// A static, single-page request for `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selectors: None,
            render: false,
            wait_time: None,
            crawl_site: false,
            max_pages: None,
        }
    }

    pub fn with_selectors<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selectors = Some(selectors.into_iter().map(Into::into).collect());
        self
    }

    pub fn rendered(mut self, wait_secs: u64) -> Self {
        self.render = true;
        self.wait_time = Some(wait_secs);
        self
    }

    pub fn crawl(mut self, max_pages: usize) -> Self {
        self.crawl_site = true;
        self.max_pages = Some(max_pages);
        self
    }
}
