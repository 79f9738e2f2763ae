use super::document::{element_text, PageDocument};
use super::types::{SelectedElement, SelectedElements};
use super::{Extractor, Fragment};
use crate::HarvestError;
use scraper::Selector;

/// Caller-supplied CSS selectors, parsed up front
pub struct SelectorExtractor {
    selectors: Vec<(String, Selector)>,
}

impl SelectorExtractor {
    /// Parses every selector, failing on the first invalid one
    pub fn new(selectors: &[String]) -> crate::Result<Self> {
        let parsed = selectors
            .iter()
            .map(|css| {
                Selector::parse(css)
                    .map(|selector| (css.clone(), selector))
                    .map_err(|e| HarvestError::InvalidSelector {
                        selector: css.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        Ok(Self { selectors: parsed })
    }
}

impl Extractor for SelectorExtractor {
    fn name(&self) -> &'static str {
        "selectors"
    }

    fn extract(&self, document: &PageDocument) -> Fragment {
        let mut extracted = SelectedElements::new();

        for (css, selector) in &self.selectors {
            let matches = document
                .html
                .select(selector)
                .map(|element| SelectedElement {
                    text: element_text(element),
                    html: element.html(),
                    attributes: element
                        .value()
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                })
                .collect();

            extracted.insert(css.clone(), matches);
        }

        Fragment::Selected(extracted)
    }
}
