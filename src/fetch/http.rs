//! Static HTTP fetcher
//!
//! This module handles plain HTTP retrieval, including:
//! - Building the HTTP client with the polite header set
//! - GET requests with redirect following
//! - Error classification into `FetchError`

use crate::config::FetchConfig;
use crate::fetch::{FetchRequest, FetchedPage, PageFetcher};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

pub(crate) const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub(crate) const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Builds an HTTP client with the polite header set
///
/// The client sends the configured user agent plus `Accept`,
/// `Accept-Language` and `Connection: keep-alive`. `Accept-Encoding` is set
/// by reqwest itself (gzip, brotli, deflate) so responses are decoded
/// transparently.
///
/// # Example
///
/// ```no_run
/// use site_harvester::config::FetchConfig;
/// use site_harvester::fetch::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10).min(config.timeout()))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()
}

/// Fetcher that performs a single non-rendering GET per call
#[derive(Debug, Clone)]
pub struct StaticFetcher {
    client: Client,
}

impl StaticFetcher {
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let client = build_http_client(config).map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
        let url_str = request.url.as_str();
        tracing::debug!("GET {}", url_str);

        let response = self
            .client
            .get(request.url.clone())
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|e| classify_error(url_str, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url_str, e))?;

        tracing::debug!(
            "Fetched {} ({} bytes, HTTP {})",
            final_url,
            body.len(),
            status.as_u16()
        );

        Ok(FetchedPage {
            url: request.url.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
            title: None,
        })
    }
}

/// Maps a reqwest error onto the fetch error kinds
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
            connect: e.is_connect(),
        }
    }
}
