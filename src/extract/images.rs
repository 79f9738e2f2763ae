use super::document::{attr, PageDocument};
use super::types::ImageInfo;
use super::{Extractor, Fragment};
use crate::url::resolve_href;

/// Source attributes in priority order; the last two are lazy-load variants
const SOURCE_ATTRIBUTES: &[&str] = &["src", "data-src", "data-lazy-src"];

/// Every `<img>` with a usable source
pub struct ImageExtractor;

impl Extractor for ImageExtractor {
    fn name(&self) -> &'static str {
        "images"
    }

    fn extract(&self, document: &PageDocument) -> Fragment {
        let images = document
            .select("img")
            .into_iter()
            .filter_map(|img| {
                let raw = SOURCE_ATTRIBUTES.iter().find_map(|name| attr(&img, name))?;
                let src = resolve_href(&document.base_url, raw)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|| raw.to_string());

                let raw_or_empty = |name: &str| img.value().attr(name).unwrap_or("").to_string();

                Some(ImageInfo {
                    src,
                    alt: raw_or_empty("alt"),
                    title: raw_or_empty("title"),
                    width: img.value().attr("width").map(str::to_string),
                    height: img.value().attr("height").map(str::to_string),
                    loading: raw_or_empty("loading"),
                })
            })
            .collect();

        Fragment::Images(images)
    }
}
