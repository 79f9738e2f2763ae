//! Extraction pipeline
//!
//! Every extractor implements [`Extractor`]: it reads a parsed
//! [`PageDocument`] and returns one [`Fragment`]. A [`Pipeline`] runs its
//! extractors in order and merges the fragments by key into an
//! [`ExtractionResult`]. Adding an extractor never touches the crawler.

mod contact;
mod document;
mod images;
mod metadata;
mod selectors;
mod social;
mod structure;
mod types;

pub use contact::ContactExtractor;
pub use document::{attr, element_text, raw_attr, PageDocument};
pub use images::ImageExtractor;
pub use metadata::MetadataExtractor;
pub use selectors::SelectorExtractor;
pub use social::{SocialExtractor, SOCIAL_PLATFORMS};
pub use structure::{StructureExtractor, MAX_PARAGRAPHS, MAX_TEXT_CHARS, MIN_PARAGRAPH_CHARS};
pub use types::{
    ContactInfo, ExtractionResult, FullContent, Headings, ImageInfo, LinkInfo, Metadata,
    MicrodataItem, PageContent, SelectedElement, SelectedElements, SocialLinks, Structure,
};

/// One extractor's contribution to an [`ExtractionResult`]
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Metadata(Metadata),
    Contact(ContactInfo),
    Social(SocialLinks),
    Images(Vec<ImageInfo>),
    Structure(Structure),
    Selected(SelectedElements),
}

/// A single extraction stage
pub trait Extractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Produces this stage's fragment for a page
    fn extract(&self, document: &PageDocument) -> Fragment;
}

/// An ordered set of extractors
pub struct Pipeline {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Pipeline {
    pub fn empty() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Full-page mode: metadata, contacts, social links, images and structure
    pub fn full() -> Self {
        let mut pipeline = Self::empty();
        pipeline.push(MetadataExtractor);
        pipeline.push(ContactExtractor);
        pipeline.push(SocialExtractor);
        pipeline.push(ImageExtractor);
        pipeline.push(StructureExtractor);
        pipeline
    }

    /// Selector mode: metadata, contacts, social links and the given selectors
    ///
    /// Fails with [`HarvestError::InvalidSelector`](crate::HarvestError) on the
    /// first selector that does not parse.
    pub fn with_selectors(selectors: &[String]) -> crate::Result<Self> {
        let selector_stage = SelectorExtractor::new(selectors)?;

        let mut pipeline = Self::empty();
        pipeline.push(MetadataExtractor);
        pipeline.push(ContactExtractor);
        pipeline.push(SocialExtractor);
        pipeline.push(selector_stage);
        Ok(pipeline)
    }

    /// Picks selector mode when any selectors are given, else full mode
    pub fn for_selectors(selectors: Option<&[String]>) -> crate::Result<Self> {
        match selectors {
            Some(list) if !list.is_empty() => Self::with_selectors(list),
            _ => Ok(Self::full()),
        }
    }

    pub fn push<E: Extractor + 'static>(&mut self, extractor: E) {
        self.extractors.push(Box::new(extractor));
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }

    /// Runs every extractor over the document and merges the fragments
    ///
    /// When a selector fragment is present the page uses the selector shape;
    /// structure and image fragments are then discarded.
    pub fn run(&self, document: &PageDocument) -> ExtractionResult {
        let mut metadata = Metadata::default();
        let mut contact_info = ContactInfo::default();
        let mut social_links = SocialLinks::new();
        let mut images = Vec::new();
        let mut structure = Structure::default();
        let mut selected: Option<SelectedElements> = None;

        for extractor in &self.extractors {
            tracing::trace!("Running {} extractor on {}", extractor.name(), document.url);

            match extractor.extract(document) {
                Fragment::Metadata(m) => metadata = m,
                Fragment::Contact(c) => contact_info = c,
                Fragment::Social(s) => {
                    for (platform, links) in s {
                        social_links.entry(platform).or_default().extend(links);
                    }
                }
                Fragment::Images(i) => images.extend(i),
                Fragment::Structure(s) => structure = s,
                Fragment::Selected(found) => {
                    selected.get_or_insert_with(SelectedElements::new).extend(found);
                }
            }
        }

        let content = match selected {
            Some(extracted) => PageContent::Selected { extracted },
            None => PageContent::Full(FullContent {
                text_content: structure.text_content,
                links: structure.links,
                images,
                headings: structure.headings,
                paragraphs: structure.paragraphs,
            }),
        };

        ExtractionResult {
            url: document.url.to_string(),
            title: document.title.clone(),
            status_code: document.status_code,
            content_type: document.content_type.clone(),
            metadata,
            contact_info,
            social_links,
            content,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::full()
    }
}
