//! Rendered fetcher backed by a pooled headless browser
//!
//! One browser process is launched lazily and shared by every rendered fetch
//! issued through the same pool. Each fetch leases a fresh page (tab); the
//! lease closes the page on every exit path, and a semaphore bounds how many
//! leases may be open at once.

use crate::config::BrowserConfig;
use crate::fetch::http::{ACCEPT_LANGUAGE_VALUE, ACCEPT_VALUE};
use crate::fetch::{FetchRequest, FetchedPage, PageFetcher};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use url::Url;

/// A launched browser and the task driving its CDP connection
struct LaunchedBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Shared headless browser with bounded page leases
pub struct BrowserPool {
    config: BrowserConfig,
    user_agent: String,
    launched: Mutex<Option<LaunchedBrowser>>,
    permits: Arc<Semaphore>,
}

impl BrowserPool {
    pub fn new(config: &BrowserConfig, user_agent: impl Into<String>) -> Self {
        Self {
            config: config.clone(),
            user_agent: user_agent.into(),
            launched: Mutex::new(None),
            permits: Arc::new(Semaphore::new(config.pool_size)),
        }
    }

    /// Leases a blank page, launching the browser on first use
    pub async fn acquire(&self, url: &Url) -> FetchResult<PageLease> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| browser_error(url, e))?;

        let mut launched = self.launched.lock().await;
        if launched.is_none() {
            *launched = Some(self.launch(url).await?);
        }

        let browser = match launched.as_ref() {
            Some(launched) => &launched.browser,
            None => return Err(browser_error(url, "browser not running")),
        };

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| browser_error(url, e))?;

        Ok(PageLease::new(page, url.to_string(), permit))
    }

    async fn launch(&self, url: &Url) -> FetchResult<LaunchedBrowser> {
        tracing::info!("Launching headless browser (pool size {})", self.config.pool_size);

        let mut builder = LaunchConfig::builder().arg(format!("--user-agent={}", self.user_agent));
        if !self.config.headless {
            builder = builder.with_head();
        }
        let launch_config = builder.build().map_err(|e| browser_error(url, e))?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| browser_error(url, e))?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(LaunchedBrowser { browser, handler })
    }

    /// Closes the browser if it was launched
    pub async fn shutdown(&self) {
        let mut launched = self.launched.lock().await;
        if let Some(mut running) = launched.take() {
            if let Err(e) = running.browser.close().await {
                tracing::warn!("Failed to close browser cleanly: {}", e);
            }
            let _ = running.browser.wait().await;
            running.handler.abort();
            tracing::debug!("Headless browser shut down");
        }
    }
}

impl Drop for BrowserPool {
    fn drop(&mut self) {
        // The browser process itself is killed by chromiumoxide's own Drop
        if let Some(running) = self.launched.get_mut().take() {
            running.handler.abort();
        }
    }
}

/// A page borrowed from the pool, closed when released or dropped
pub struct PageLease {
    page: Option<Page>,
    url: String,
    _permit: OwnedSemaphorePermit,
    runtime: tokio::runtime::Handle,
}

impl PageLease {
    fn new(page: Page, url: String, permit: OwnedSemaphorePermit) -> Self {
        Self {
            page: Some(page),
            url,
            _permit: permit,
            runtime: tokio::runtime::Handle::current(),
        }
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Closes the page and returns the slot to the pool
    pub async fn release(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::warn!("Failed to close page for {}: {}", self.url, e);
            }
        }
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        if let Some(page) = self.page.take() {
            let url = std::mem::take(&mut self.url);
            self.runtime.spawn(async move {
                if let Err(e) = page.close().await {
                    tracing::warn!("Page cleanup failed for {}: {}", url, e);
                }
            });
        }
    }
}

/// Fetcher that renders pages in the pooled headless browser
pub struct RenderedFetcher {
    pool: BrowserPool,
}

impl RenderedFetcher {
    pub fn new(pool: BrowserPool) -> Self {
        Self { pool }
    }

    async fn render(&self, lease: &PageLease, request: &FetchRequest) -> FetchResult<FetchedPage> {
        let url = &request.url;
        let page = lease
            .page()
            .ok_or_else(|| browser_error(url, "page already released"))?;

        let headers = Headers::new(serde_json::json!({
            "Accept": ACCEPT_VALUE,
            "Accept-Language": ACCEPT_LANGUAGE_VALUE,
            "Accept-Encoding": "gzip, deflate, br",
            "Connection": "keep-alive",
        }));
        page.execute(SetExtraHttpHeadersParams::new(headers))
            .await
            .map_err(|e| browser_error(url, e))?;

        match tokio::time::timeout(request.timeout, navigate_until_idle(page, url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(browser_error(url, e)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
        }

        // Fixed settle time for late scripts, independent of content readiness
        tokio::time::sleep(request.wait).await;

        let title = page.get_title().await.map_err(|e| browser_error(url, e))?;
        let body = page.content().await.map_err(|e| browser_error(url, e))?;
        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        Ok(FetchedPage {
            url: url.clone(),
            final_url,
            status_code: 200,
            content_type: "text/html".to_string(),
            body,
            title,
        })
    }
}

#[async_trait]
impl PageFetcher for RenderedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
        tracing::debug!("Rendering {}", request.url);
        let lease = self.pool.acquire(&request.url).await?;
        let outcome = self.render(&lease, request).await;
        lease.release().await;
        outcome
    }

    async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}

/// Navigates and waits for the main frame's `networkIdle` lifecycle event
///
/// Lifecycle events of the previous document are ignored until the new
/// document's `init` event arrives.
async fn navigate_until_idle(page: &Page, url: &Url) -> Result<(), CdpError> {
    page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;
    let mut events = page.event_listener::<EventLifecycleEvent>().await?;

    page.goto(url.as_str()).await?;
    let main_frame = page.mainframe().await?;

    let mut navigated = false;
    while let Some(event) = events.next().await {
        if main_frame.as_ref().is_some_and(|id| *id != event.frame_id) {
            continue;
        }
        match event.name.as_str() {
            "init" => navigated = true,
            "networkIdle" if navigated => return Ok(()),
            _ => {}
        }
    }

    tracing::debug!("Lifecycle stream for {} ended before network idle", url);
    Ok(())
}

fn browser_error(url: &Url, e: impl std::fmt::Display) -> FetchError {
    FetchError::Browser {
        url: url.to_string(),
        message: e.to_string(),
    }
}
