//! Scrape coordinator - single-page and site-crawl orchestration
//!
//! This module decides how a [`ScrapeRequest`] is served:
//! - Preparing the target URL and validating selectors before any fetch
//! - Choosing the static or rendered fetcher for the whole operation
//! - Single-page extraction, where a fetch failure fails the request
//! - Breadth-first site crawls, where a failing page is logged and skipped

use crate::config::HarvesterConfig;
use crate::crawler::aggregate::{CrawlResult, ScrapeOutput};
use crate::crawler::frontier::CrawlState;
use crate::crawler::request::ScrapeRequest;
use crate::extract::{ExtractionResult, PageDocument, Pipeline};
use crate::fetch::{
    fetch_with_retry, FetchMode, FetchRequest, FetchedPage, PageFetcher, RetryPolicy,
    StaticFetcher,
};
use crate::url::{is_site_root, prepare_target, resolve_href};
use crate::{FetchResult, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Serves scrape requests with a fixed pair of fetchers
pub struct Coordinator {
    config: Arc<HarvesterConfig>,
    static_fetcher: Arc<dyn PageFetcher>,
    rendered_fetcher: Arc<dyn PageFetcher>,
    retry: RetryPolicy,
}

impl Coordinator {
    /// Creates a coordinator with the default fetchers for `config`
    ///
    /// Rendered fetches use the pooled headless browser when the crate is
    /// built with the `browser` feature and fail with
    /// `FetchError::RenderingUnavailable` otherwise.
    pub fn new(config: HarvesterConfig) -> Result<Self> {
        let static_fetcher: Arc<dyn PageFetcher> = Arc::new(StaticFetcher::new(&config.fetch)?);
        let rendered_fetcher = default_rendered_fetcher(&config);
        let retry = RetryPolicy::from_config(&config.fetch);

        Ok(Self {
            config: Arc::new(config),
            static_fetcher,
            rendered_fetcher,
            retry,
        })
    }

    /// Replaces the fetcher used for static requests
    pub fn with_static_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.static_fetcher = fetcher;
        self
    }

    /// Replaces the fetcher used for rendered requests
    pub fn with_rendered_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.rendered_fetcher = fetcher;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn config(&self) -> &HarvesterConfig {
        &self.config
    }

    /// Serves one scrape request
    ///
    /// A crawl runs only when the request asks for one and the target is a
    /// site root; any other target is scraped as a single page. In crawl
    /// mode the selector list is ignored so every page yields its links.
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeOutput> {
        let target = prepare_target(&request.url)?;
        let pipeline = Pipeline::for_selectors(request.selectors.as_deref())?;

        let mode = FetchMode::from_render_flag(request.render);
        let wait = Duration::from_secs(
            request
                .wait_time
                .unwrap_or(self.config.crawl.default_wait_secs),
        );

        if request.crawl_site && is_site_root(&target) {
            let page_cap = request
                .max_pages
                .unwrap_or(self.config.crawl.default_max_pages);
            let crawl = self.crawl_site(&target, mode, wait, page_cap).await?;
            return Ok(ScrapeOutput::Crawl(crawl));
        }

        if request.crawl_site {
            tracing::info!(
                "{} is not a site root, scraping it as a single page",
                target
            );
        }

        let page = self.scrape_page(&target, mode, wait, &pipeline).await?;
        Ok(ScrapeOutput::Page(page))
    }

    /// Fetches and extracts a single page
    pub async fn scrape_page(
        &self,
        url: &Url,
        mode: FetchMode,
        wait: Duration,
        pipeline: &Pipeline,
    ) -> Result<ExtractionResult> {
        let fetched = self.fetch(url, mode, wait).await?;
        Ok(extract_page(&fetched, pipeline))
    }

    /// Breadth-first crawl of the seed's site, bounded by `page_cap`
    ///
    /// Pages that fail to fetch are logged and skipped; they neither count
    /// toward `pages_crawled` nor appear in the report.
    pub async fn crawl_site(
        &self,
        seed: &Url,
        mode: FetchMode,
        wait: Duration,
        page_cap: usize,
    ) -> Result<CrawlResult> {
        let pipeline = Pipeline::full();
        let mut state = CrawlState::new(seed, page_cap)?;
        let mut result = CrawlResult::new(seed.as_str());
        let start_time = Instant::now();

        tracing::info!(
            "Starting {:?} crawl of {} (site {}, cap {} pages)",
            mode,
            seed,
            state.site(),
            state.page_cap()
        );

        while let Some(url) = state.next_url() {
            let fetched = match self.fetch(&url, mode, wait).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                    continue;
                }
            };

            let page = extract_page(&fetched, &pipeline);

            for link in page.links() {
                if let Some(resolved) = resolve_href(&url, &link.href) {
                    state.offer(&resolved);
                }
            }

            result.push(page);
            state.record_success();

            tracing::info!(
                "Progress: {}/{} pages crawled, {} in frontier",
                state.pages_crawled(),
                state.page_cap(),
                state.frontier_len()
            );
        }

        tracing::info!(
            "Crawl of {} completed: {} pages in {:?} ({} URLs visited)",
            seed,
            result.pages_crawled,
            start_time.elapsed(),
            state.visited_len()
        );

        Ok(result)
    }

    /// Releases fetcher resources such as the browser pool
    pub async fn shutdown(&self) {
        self.static_fetcher.shutdown().await;
        self.rendered_fetcher.shutdown().await;
    }

    async fn fetch(&self, url: &Url, mode: FetchMode, wait: Duration) -> FetchResult<FetchedPage> {
        let request = FetchRequest::new(url.clone(), mode, self.config.fetch.timeout(), wait);
        let fetcher = match mode {
            FetchMode::Static => &self.static_fetcher,
            FetchMode::Rendered => &self.rendered_fetcher,
        };
        fetch_with_retry(&**fetcher, &request, self.retry).await
    }
}

/// Parses and extracts a fetched page
///
/// The parsed DOM is not `Send`, so it lives only inside this call.
fn extract_page(fetched: &FetchedPage, pipeline: &Pipeline) -> ExtractionResult {
    let document = PageDocument::parse(fetched);
    let result = pipeline.run(&document);
    tracing::debug!(
        "Extracted {} ({} links)",
        result.url,
        result.links().len()
    );
    result
}

#[cfg(feature = "browser")]
fn default_rendered_fetcher(config: &HarvesterConfig) -> Arc<dyn PageFetcher> {
    use crate::fetch::{BrowserPool, RenderedFetcher};

    let pool = BrowserPool::new(&config.browser, config.fetch.user_agent.clone());
    Arc::new(RenderedFetcher::new(pool))
}

#[cfg(not(feature = "browser"))]
fn default_rendered_fetcher(_config: &HarvesterConfig) -> Arc<dyn PageFetcher> {
    Arc::new(crate::fetch::UnavailableRenderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FetchError, HarvestError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned HTML keyed by URL and records every request
    struct SiteFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl SiteFetcher {
        fn new(pages: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for SiteFetcher {
        async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
            self.requests.lock().unwrap().push(request.url.to_string());
            match self.pages.get(request.url.as_str()) {
                Some(body) => Ok(FetchedPage {
                    url: request.url.clone(),
                    final_url: request.url.clone(),
                    status_code: 200,
                    content_type: "text/html".to_string(),
                    body: body.clone(),
                    title: None,
                }),
                None => Err(FetchError::Status {
                    url: request.url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn coordinator(fetcher: Arc<SiteFetcher>) -> Coordinator {
        Coordinator::new(HarvesterConfig::default())
            .unwrap()
            .with_static_fetcher(fetcher)
            .with_retry_policy(RetryPolicy::none())
    }

    fn crawl(output: ScrapeOutput) -> CrawlResult {
        match output {
            ScrapeOutput::Crawl(c) => c,
            ScrapeOutput::Page(p) => panic!("expected crawl, got page {}", p.url),
        }
    }

    #[tokio::test]
    async fn test_single_page_scrape() {
        let fetcher = SiteFetcher::new(&[(
            "https://example.com/about",
            "<title>About</title><a href='/'>home</a>",
        )]);
        let output = coordinator(fetcher)
            .scrape(&ScrapeRequest::new("example.com/about"))
            .await
            .unwrap();

        let page = output.as_page().unwrap();
        assert_eq!(page.title.as_deref(), Some("About"));
        assert_eq!(page.links()[0].href, "https://example.com/");
    }

    #[tokio::test]
    async fn test_single_page_failure_is_error() {
        let fetcher = SiteFetcher::new(&[]);
        let result = coordinator(fetcher)
            .scrape(&ScrapeRequest::new("https://example.com/gone"))
            .await;

        assert!(matches!(
            result,
            Err(HarvestError::Fetch(FetchError::Status { status: 404, .. }))
        ));
    }

    #[tokio::test]
    async fn test_crawl_respects_cap() {
        let fetcher = SiteFetcher::new(&[
            ("https://example.com/", "<a href='/one'>1</a>"),
            ("https://example.com/one", "<a href='/two'>2</a>"),
            ("https://example.com/two", "<title>Two</title>"),
        ]);
        let output = coordinator(fetcher.clone())
            .scrape(&ScrapeRequest::new("https://example.com").crawl(2))
            .await
            .unwrap();

        let result = crawl(output);
        assert_eq!(result.pages_crawled, 2);
        assert!(result.pages.iter().all(|p| !p.url.ends_with("/two")));
        assert_eq!(fetcher.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_crawl_stays_on_host_and_dedups() {
        let fetcher = SiteFetcher::new(&[
            (
                "https://example.com/",
                r#"<a href="/a">a</a><a href="/a/#x">a again</a>
                   <a href="https://other.org/">ext</a>
                   <a href="https://sub.example.com/">sub</a>"#,
            ),
            ("https://example.com/a", r#"<a href="/">home</a><a href="/a">self</a>"#),
        ]);
        let output = coordinator(fetcher.clone())
            .scrape(&ScrapeRequest::new("https://example.com/").crawl(10))
            .await
            .unwrap();

        let result = crawl(output);
        assert_eq!(result.pages_crawled, 2);

        let requested = fetcher.requested();
        assert_eq!(requested, vec!["https://example.com/", "https://example.com/a"]);
    }

    #[tokio::test]
    async fn test_crawl_skips_failed_pages() {
        let fetcher = SiteFetcher::new(&[
            ("https://example.com/", "<a href='/missing'>x</a><a href='/ok'>y</a>"),
            ("https://example.com/ok", "<title>OK</title>"),
        ]);
        let output = coordinator(fetcher)
            .scrape(&ScrapeRequest::new("https://example.com/").crawl(5))
            .await
            .unwrap();

        let result = crawl(output);
        assert_eq!(result.pages_crawled, 2);
        let urls: Vec<_> = result.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.com/", "https://example.com/ok"]);
    }

    #[tokio::test]
    async fn test_crawl_flag_ignored_for_non_root() {
        let fetcher = SiteFetcher::new(&[(
            "https://example.com/blog",
            "<title>Blog</title><a href='/post'>p</a>",
        )]);
        let output = coordinator(fetcher.clone())
            .scrape(&ScrapeRequest::new("https://example.com/blog").crawl(5))
            .await
            .unwrap();

        assert!(output.as_page().is_some());
        assert_eq!(fetcher.requested().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_selector_rejected_before_fetch() {
        let fetcher = SiteFetcher::new(&[("https://example.com/", "<p>x</p>")]);
        let result = coordinator(fetcher.clone())
            .scrape(&ScrapeRequest::new("https://example.com/").with_selectors(["p["]))
            .await;

        assert!(matches!(result, Err(HarvestError::InvalidSelector { .. })));
        assert!(fetcher.requested().is_empty());
    }

    #[tokio::test]
    async fn test_selector_mode_page() {
        let fetcher = SiteFetcher::new(&[(
            "https://example.com/shop",
            "<span class='price'>$5</span><h1>Shop</h1>",
        )]);
        let output = coordinator(fetcher)
            .scrape(&ScrapeRequest::new("https://example.com/shop").with_selectors([".price"]))
            .await
            .unwrap();

        let page = output.as_page().unwrap();
        assert!(page.is_selector_mode());
        let json = serde_json::to_value(page).unwrap();
        assert_eq!(json["extracted"][".price"][0]["text"], "$5");
        assert!(json.get("headings").is_none());
    }

    #[tokio::test]
    async fn test_rendered_mode_uses_rendered_fetcher() {
        let statics = SiteFetcher::new(&[]);
        let rendered = SiteFetcher::new(&[("https://example.com/app", "<title>App</title>")]);
        let coordinator = coordinator(statics.clone()).with_rendered_fetcher(rendered.clone());

        let output = coordinator
            .scrape(&ScrapeRequest::new("https://example.com/app").rendered(0))
            .await
            .unwrap();

        assert_eq!(output.title(), Some("App"));
        assert!(statics.requested().is_empty());
        assert_eq!(rendered.requested().len(), 1);
    }

    #[cfg(not(feature = "browser"))]
    #[tokio::test]
    async fn test_rendered_mode_without_browser_feature() {
        let coordinator = Coordinator::new(HarvesterConfig::default()).unwrap();
        let result = coordinator
            .scrape(&ScrapeRequest::new("https://example.com/").rendered(0))
            .await;

        assert!(matches!(
            result,
            Err(HarvestError::Fetch(FetchError::RenderingUnavailable))
        ));
    }

    #[tokio::test]
    async fn test_crawl_is_deterministic() {
        let pages = [
            ("https://example.com/", "<a href='/b'>b</a><a href='/a'>a</a>"),
            ("https://example.com/a", "<p>Contact us at team@example.com today</p>"),
            ("https://example.com/b", "<a href='/a'>a</a>"),
        ];
        let first = coordinator(SiteFetcher::new(&pages))
            .scrape(&ScrapeRequest::new("https://example.com/").crawl(5))
            .await
            .unwrap();
        let second = coordinator(SiteFetcher::new(&pages))
            .scrape(&ScrapeRequest::new("https://example.com/").crawl(5))
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let order: Vec<_> = crawl(first).pages.into_iter().map(|p| p.url).collect();
        assert_eq!(
            order,
            vec!["https://example.com/", "https://example.com/b", "https://example.com/a"]
        );
    }
}
