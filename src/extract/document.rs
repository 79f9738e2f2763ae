//! Parsed page documents
//!
//! A [`PageDocument`] is built once per fetched page and handed to every
//! extractor. It owns the parsed DOM, so it stays on the thread that parsed it.

use crate::fetch::FetchedPage;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Elements whose text never counts as visible page text
const HIDDEN_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// A fetched page parsed and ready for extraction
pub struct PageDocument {
    /// The URL that was requested
    pub url: Url,

    /// URL relative links are resolved against (the requested URL, not the
    /// post-redirect one)
    pub base_url: Url,

    pub status_code: u16,

    pub content_type: String,

    pub title: Option<String>,

    /// Parsed DOM
    pub html: Html,

    /// Visible text, one text node per line
    pub text: String,
}

impl PageDocument {
    /// Parses a fetched page
    ///
    /// A browser-reported title wins over the `<title>` element.
    pub fn parse(page: &FetchedPage) -> Self {
        let html = Html::parse_document(&page.body);
        let title = page
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or_else(|| extract_title(&html));
        let text = visible_text(&html);

        Self {
            url: page.url.clone(),
            base_url: page.url.clone(),
            status_code: page.status_code,
            content_type: page.content_type.clone(),
            title,
            html,
            text,
        }
    }

    /// Builds a document straight from markup, as a 200 `text/html` response
    ///
    /// # Example
    ///
    /// ```
    /// use site_harvester::extract::PageDocument;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://example.com/").unwrap();
    /// let doc = PageDocument::from_html(url, "<title>Test</title><p>Hello</p>");
    /// assert_eq!(doc.title.as_deref(), Some("Test"));
    /// ```
    pub fn from_html(url: Url, markup: &str) -> Self {
        Self::parse(&FetchedPage {
            url: url.clone(),
            final_url: url,
            status_code: 200,
            content_type: "text/html".to_string(),
            body: markup.to_string(),
            title: None,
        })
    }

    /// Returns every element matching a static CSS selector, in document order
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
}

/// Collects the document's visible text nodes, trimmed, one per line
fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_TEXT_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }

    parts.join("\n")
}

/// Returns an element's text: trimmed text nodes joined by single spaces
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns a non-empty, trimmed attribute value
pub fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Returns a non-empty attribute value exactly as written
pub fn raw_attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name).filter(|v| !v.is_empty())
}
