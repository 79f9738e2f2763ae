use super::document::{attr, element_text, raw_attr, PageDocument};
use super::types::{Metadata, MicrodataItem};
use super::{Extractor, Fragment};
use once_cell::sync::Lazy;
use scraper::Selector;
use std::collections::BTreeMap;

/// Maximum number of itemscope elements inspected for microdata
const MAX_MICRODATA_ITEMS: usize = 5;

static ITEMPROP: Lazy<Selector> =
    Lazy::new(|| Selector::parse("[itemprop]").expect("static selector"));

/// Meta tags, Open Graph, Twitter cards, JSON-LD and microdata
pub struct MetadataExtractor;

impl Extractor for MetadataExtractor {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn extract(&self, document: &PageDocument) -> Fragment {
        let mut metadata = Metadata::default();

        for meta in document.select("meta") {
            let key = attr(&meta, "name")
                .or_else(|| attr(&meta, "property"))
                .or_else(|| attr(&meta, "itemprop"));
            let content = raw_attr(&meta, "content");

            if let (Some(key), Some(content)) = (key, content) {
                classify(&mut metadata, key, content);
            }
        }

        // Some pages put og: in `name` and twitter: in `property`
        for meta in document.select(r#"meta[property^="og:"]"#) {
            let key = attr(&meta, "property");
            if let (Some(key), Some(content)) = (key, raw_attr(&meta, "content")) {
                metadata.open_graph.insert(key.to_string(), content.to_string());
            }
        }
        for meta in document.select(r#"meta[name^="twitter:"]"#) {
            let key = attr(&meta, "name");
            if let (Some(key), Some(content)) = (key, raw_attr(&meta, "content")) {
                metadata.twitter_cards.insert(key.to_string(), content.to_string());
            }
        }

        metadata.structured_data = json_ld(document);
        metadata.microdata = microdata(document);

        Fragment::Metadata(metadata)
    }
}

fn classify(metadata: &mut Metadata, key: &str, content: &str) {
    let target = if key.starts_with("og:") {
        &mut metadata.open_graph
    } else if key.starts_with("twitter:") {
        &mut metadata.twitter_cards
    } else {
        &mut metadata.meta_tags
    };
    target.insert(key.to_string(), content.to_string());
}

fn json_ld(document: &PageDocument) -> Vec<serde_json::Value> {
    let mut blocks = Vec::new();

    for script in document.select(r#"script[type="application/ld+json"]"#) {
        let raw: String = script.text().collect();
        match serde_json::from_str::<serde_json::Value>(raw.trim()) {
            Ok(value) => blocks.push(value),
            Err(e) => {
                tracing::debug!("Dropping malformed JSON-LD block on {}: {}", document.url, e);
            }
        }
    }

    blocks
}

fn microdata(document: &PageDocument) -> Option<Vec<MicrodataItem>> {
    let scopes = document.select("[itemscope]");
    if scopes.is_empty() {
        return None;
    }

    let items = scopes
        .into_iter()
        .take(MAX_MICRODATA_ITEMS)
        .map(|scope| {
            let mut item = BTreeMap::new();
            if let Some(kind) = raw_attr(&scope, "itemtype") {
                item.insert("type".to_string(), kind.to_string());
            }

            for prop in scope.select(&ITEMPROP) {
                let Some(name) = attr(&prop, "itemprop") else {
                    continue;
                };
                let value = raw_attr(&prop, "content")
                    .map(str::to_string)
                    .unwrap_or_else(|| element_text(prop));
                if !value.is_empty() {
                    item.insert(name.to_string(), value);
                }
            }

            item
        })
        .filter(|item| !item.is_empty())
        .collect();

    Some(items)
}
