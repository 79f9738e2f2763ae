//! Structured extraction results
//!
//! Every type here serializes to a plain nested key/value document so results
//! can be stored or exported without further mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Platform name → resolved profile/share URLs, in document order
pub type SocialLinks = BTreeMap<String, Vec<String>>;

/// Selector → matched elements
pub type SelectedElements = BTreeMap<String, Vec<SelectedElement>>;

/// One microdata item: `type` plus its named properties
pub type MicrodataItem = BTreeMap<String, String>;

/// Structured extraction of a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The URL that was requested
    pub url: String,

    /// Page title
    pub title: Option<String>,

    /// HTTP status code of the fetch
    pub status_code: u16,

    /// Content-Type of the fetch
    pub content_type: String,

    pub metadata: Metadata,

    pub contact_info: ContactInfo,

    pub social_links: SocialLinks,

    /// Either the selector-scoped fragment or the full structural bundle
    #[serde(flatten)]
    pub content: PageContent,
}

impl ExtractionResult {
    /// Links found on the page (empty in selector mode)
    pub fn links(&self) -> &[LinkInfo] {
        match &self.content {
            PageContent::Full(full) => &full.links,
            PageContent::Selected { .. } => &[],
        }
    }

    pub fn is_selector_mode(&self) -> bool {
        matches!(self.content, PageContent::Selected { .. })
    }
}

/// The two mutually exclusive page output shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageContent {
    /// Only what the caller's selectors matched
    Selected { extracted: SelectedElements },
    /// Links, images, headings, paragraphs and raw text
    Full(FullContent),
}

/// Full-page structural bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullContent {
    pub text_content: String,
    pub links: Vec<LinkInfo>,
    pub images: Vec<ImageInfo>,
    pub headings: Headings,
    pub paragraphs: Vec<String>,
}

/// Page metadata gathered from meta tags and structured data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub meta_tags: BTreeMap<String, String>,
    pub open_graph: BTreeMap<String, String>,
    pub twitter_cards: BTreeMap<String, String>,
    pub structured_data: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microdata: Option<Vec<MicrodataItem>>,
}

/// Contact details found in the page text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Distinct email addresses, sorted
    pub emails: Vec<String>,
    /// Distinct phone-like strings, first-seen order, at most 10
    pub phones: Vec<String>,
}

/// An anchor on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkInfo {
    pub text: String,
    pub href: String,
    pub title: String,
}

/// An image on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    pub title: String,
    pub width: Option<String>,
    pub height: Option<String>,
    pub loading: String,
}

/// Heading texts by level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
}

/// An element matched by a caller-supplied selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedElement {
    pub text: String,
    pub html: String,
    pub attributes: BTreeMap<String, String>,
}

/// Structural fragment produced by the structure extractor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    pub text_content: String,
    pub links: Vec<LinkInfo>,
    pub headings: Headings,
    pub paragraphs: Vec<String>,
}
