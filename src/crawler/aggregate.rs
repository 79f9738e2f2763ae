//! Result aggregation
//!
//! A single-page scrape returns its [`ExtractionResult`] unchanged. A site
//! crawl folds each page into a [`PageSummary`] that keeps only the page's
//! identity, metadata, contacts and social links, so reports stay small no
//! matter how link-heavy the pages are.

use crate::extract::{ContactInfo, ExtractionResult, Metadata, SocialLinks};
use serde::{Deserialize, Serialize};

/// Marker carried by every crawl report
pub const SITE_WIDE: &str = "site_wide";

/// The reduced per-page record kept in a crawl report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    pub url: String,
    pub title: Option<String>,
    pub metadata: Metadata,
    pub contact_info: ContactInfo,
    pub social_links: SocialLinks,
}

impl From<ExtractionResult> for PageSummary {
    fn from(result: ExtractionResult) -> Self {
        Self {
            url: result.url,
            title: result.title,
            metadata: result.metadata,
            contact_info: result.contact_info,
            social_links: result.social_links,
        }
    }
}

/// Report of a bounded site crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// The seed URL
    pub base_url: String,

    /// Pages fetched and extracted successfully
    pub pages_crawled: usize,

    /// Per-page summaries in visit order
    pub pages: Vec<PageSummary>,

    pub crawl_type: String,
}

impl CrawlResult {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pages_crawled: 0,
            pages: Vec::new(),
            crawl_type: SITE_WIDE.to_string(),
        }
    }

    /// Appends a page in visit order
    pub fn push(&mut self, result: ExtractionResult) {
        self.pages.push(PageSummary::from(result));
        self.pages_crawled = self.pages.len();
    }
}

/// Final output of a scrape: one page or a crawl report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeOutput {
    Crawl(CrawlResult),
    Page(ExtractionResult),
}

impl ScrapeOutput {
    pub fn as_page(&self) -> Option<&ExtractionResult> {
        match self {
            Self::Page(page) => Some(page),
            Self::Crawl(_) => None,
        }
    }

    pub fn as_crawl(&self) -> Option<&CrawlResult> {
        match self {
            Self::Crawl(crawl) => Some(crawl),
            Self::Page(_) => None,
        }
    }

    /// Title of the page, or of the seed page for a crawl
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Page(page) => page.title.as_deref(),
            Self::Crawl(crawl) => crawl.pages.first().and_then(|p| p.title.as_deref()),
        }
    }
}
