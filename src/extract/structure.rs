use super::document::{element_text, PageDocument};
use super::types::{Headings, LinkInfo, Structure};
use super::{Extractor, Fragment};
use crate::url::resolve_href;

/// Paragraphs must be longer than this many characters to be kept
pub const MIN_PARAGRAPH_CHARS: usize = 20;

/// Paragraphs kept per page
pub const MAX_PARAGRAPHS: usize = 50;

/// Characters of visible text kept per page
pub const MAX_TEXT_CHARS: usize = 50_000;

/// Headings, links, paragraphs and visible text of the whole page
pub struct StructureExtractor;

impl Extractor for StructureExtractor {
    fn name(&self) -> &'static str {
        "structure"
    }

    fn extract(&self, document: &PageDocument) -> Fragment {
        Fragment::Structure(Structure {
            text_content: truncate_chars(&document.text, MAX_TEXT_CHARS),
            links: links(document),
            headings: headings(document),
            paragraphs: paragraphs(document),
        })
    }
}

fn headings(document: &PageDocument) -> Headings {
    let texts = |css: &str| -> Vec<String> {
        document.select(css).into_iter().map(element_text).collect()
    };

    Headings {
        h1: texts("h1"),
        h2: texts("h2"),
        h3: texts("h3"),
    }
}

fn links(document: &PageDocument) -> Vec<LinkInfo> {
    document
        .select("a[href]")
        .into_iter()
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let resolved = resolve_href(&document.base_url, href)
                .map(|u| u.to_string())
                .unwrap_or_else(|| href.to_string());

            Some(LinkInfo {
                text: element_text(anchor),
                href: resolved,
                title: anchor.value().attr("title").unwrap_or("").to_string(),
            })
        })
        .collect()
}

fn paragraphs(document: &PageDocument) -> Vec<String> {
    document
        .select("p")
        .into_iter()
        .map(element_text)
        .filter(|text| text.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(MAX_PARAGRAPHS)
        .collect()
}

/// Keeps at most `max` Unicode scalar values
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}
