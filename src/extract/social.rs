use super::document::PageDocument;
use super::types::SocialLinks;
use super::{Extractor, Fragment};
use crate::url::{matches_domain, resolve_href};

/// Known platforms and their domains, in matching priority order
pub const SOCIAL_PLATFORMS: &[(&str, &[&str])] = &[
    ("facebook", &["facebook.com", "fb.com"]),
    ("twitter", &["twitter.com", "x.com"]),
    ("instagram", &["instagram.com"]),
    ("linkedin", &["linkedin.com"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("github", &["github.com"]),
    ("pinterest", &["pinterest.com"]),
    ("tiktok", &["tiktok.com"]),
];

/// Links to known social platforms, grouped by platform
pub struct SocialExtractor;

impl Extractor for SocialExtractor {
    fn name(&self) -> &'static str {
        "social"
    }

    fn extract(&self, document: &PageDocument) -> Fragment {
        let mut found = SocialLinks::new();

        for anchor in document.select("a[href]") {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(resolved) = resolve_href(&document.base_url, href) else {
                continue;
            };
            let Some(host) = resolved.host_str() else {
                continue;
            };

            if let Some(platform) = platform_for_host(host) {
                found
                    .entry(platform.to_string())
                    .or_default()
                    .push(resolved.to_string());
            }
        }

        Fragment::Social(found)
    }
}

/// Returns the first platform whose domain list covers `host`
pub fn platform_for_host(host: &str) -> Option<&'static str> {
    SOCIAL_PLATFORMS
        .iter()
        .find(|(_, domains)| domains.iter().any(|d| matches_domain(d, host)))
        .map(|(name, _)| *name)
}
