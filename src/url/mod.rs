//! URL handling module for Site-Harvester
//!
//! This module turns user targets into fetchable URLs, normalizes URLs for the
//! crawl's visited set, and answers the host questions the crawler and the
//! social-link extractor ask.

mod domain;
mod matcher;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, site_key};
pub use matcher::matches_domain;
pub use normalize::normalize_url;

/// Turns a user-supplied target (full URL or bare domain) into a URL
///
/// A target without an explicit `scheme://` is treated as an HTTPS site,
/// so `example.com` becomes `https://example.com/`.
///
/// # Examples
///
/// ```
/// use site_harvester::url::prepare_target;
///
/// let url = prepare_target("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
///
/// let url = prepare_target("http://example.com/about").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/about");
/// ```
pub fn prepare_target(target: &str) -> UrlResult<Url> {
    let target = target.trim();
    if target.is_empty() {
        return Err(UrlError::Parse("empty target".to_string()));
    }

    let candidate = if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true if the URL points at the root of its site (path empty or `/`)
pub fn is_site_root(url: &Url) -> bool {
    matches!(url.path(), "" | "/")
}

/// Resolves an href found on a page against that page's URL
///
/// Returns None when the href cannot be joined onto the base.
pub fn resolve_href(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}
