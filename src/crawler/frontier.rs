//! Crawl traversal state
//!
//! [`CrawlState`] owns everything one site crawl mutates: the visited set,
//! the FIFO frontier, the site scope and the page counter. It is created per
//! crawl and dropped when the crawl returns, so concurrent crawls never
//! share it.

use crate::url::{normalize_url, site_key};
use crate::{UrlError, UrlResult};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// Traversal state for a single breadth-first site crawl
#[derive(Debug)]
pub struct CrawlState {
    /// Host (and explicit port) every frontier URL must share
    site: String,

    /// Maximum successful pages
    page_cap: usize,

    /// URLs already handed out for fetching
    visited: HashSet<String>,

    /// URLs ever placed in the frontier
    enqueued: HashSet<String>,

    /// URLs waiting to be fetched, earliest first
    frontier: VecDeque<Url>,

    /// Successfully processed pages
    pages_crawled: usize,
}

impl CrawlState {
    /// Creates the state and seeds the frontier with the normalized seed
    pub fn new(seed: &Url, page_cap: usize) -> UrlResult<Self> {
        let seed = normalize_url(seed.as_str())?;
        let site = site_key(&seed).ok_or(UrlError::MissingHost)?;

        let mut state = Self {
            site,
            page_cap,
            visited: HashSet::new(),
            enqueued: HashSet::new(),
            frontier: VecDeque::new(),
            pages_crawled: 0,
        };
        state.enqueued.insert(seed.to_string());
        state.frontier.push_back(seed);

        Ok(state)
    }

    /// Pops the next unvisited URL and marks it visited
    ///
    /// Returns None once the page cap is reached or the frontier is empty.
    pub fn next_url(&mut self) -> Option<Url> {
        while self.pages_crawled < self.page_cap {
            let url = self.frontier.pop_front()?;
            if self.visited.insert(url.to_string()) {
                return Some(url);
            }
        }
        None
    }

    /// Records one successfully processed page
    pub fn record_success(&mut self) {
        self.pages_crawled += 1;
    }

    /// Offers a discovered link to the frontier
    ///
    /// The link is accepted only if it normalizes, shares the seed's site,
    /// was never enqueued before and the frontier holds fewer than twice the
    /// page cap.
    pub fn offer(&mut self, link: &Url) -> bool {
        let Ok(normalized) = normalize_url(link.as_str()) else {
            return false;
        };

        if site_key(&normalized).as_deref() != Some(self.site.as_str()) {
            return false;
        }

        let key = normalized.to_string();
        if self.visited.contains(&key) || self.enqueued.contains(&key) {
            return false;
        }

        if self.frontier.len() >= self.frontier_limit() {
            return false;
        }

        self.enqueued.insert(key);
        self.frontier.push_back(normalized);
        true
    }

    pub fn pages_crawled(&self) -> usize {
        self.pages_crawled
    }

    pub fn page_cap(&self) -> usize {
        self.page_cap
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    fn frontier_limit(&self) -> usize {
        self.page_cap.saturating_mul(2)
    }
}
