//! Crawler module for scrape orchestration
//!
//! This module contains the core scraping logic, including:
//! - The scrape request accepted from callers
//! - Single-page vs site-crawl decision and the breadth-first traversal
//! - Per-crawl frontier, visited set and page cap
//! - Folding page results into crawl reports

mod aggregate;
mod coordinator;
mod frontier;
mod request;

pub use aggregate::{CrawlResult, PageSummary, ScrapeOutput, SITE_WIDE};
pub use coordinator::Coordinator;
pub use frontier::CrawlState;
pub use request::ScrapeRequest;

use crate::config::HarvesterConfig;

/// Runs a single scrape request with a fresh coordinator
///
/// The coordinator's fetchers, including any launched browser, are shut
/// down before returning.
///
/// # Example
///
/// ```no_run
/// use site_harvester::config::HarvesterConfig;
/// use site_harvester::crawler::{scrape, ScrapeRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let output = scrape(HarvesterConfig::default(), &ScrapeRequest::new("example.com")).await?;
/// println!("{}", serde_json::to_string_pretty(&output)?);
/// # Ok(())
/// # }
/// ```
pub async fn scrape(
    config: HarvesterConfig,
    request: &ScrapeRequest,
) -> crate::Result<ScrapeOutput> {
    let coordinator = Coordinator::new(config)?;
    let outcome = coordinator.scrape(request).await;
    coordinator.shutdown().await;
    outcome
}
