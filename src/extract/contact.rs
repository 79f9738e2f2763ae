use super::document::PageDocument;
use super::types::ContactInfo;
use super::{Extractor, Fragment};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Maximum number of phone numbers reported per page
pub const MAX_PHONES: usize = 10;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("email pattern")
});

/// International, US-parenthesized and plain-digit forms, in that order
static PHONES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"\+?\d{1,3}[-.\s]?\(?\d{1,4}\)?[-.\s]?\d{1,4}[-.\s]?\d{1,9}")
            .expect("international phone pattern"),
        Regex::new(r"\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").expect("US phone pattern"),
        Regex::new(r"\d{3}[-.\s]?\d{3}[-.\s]?\d{4}").expect("plain phone pattern"),
    ]
});

/// Email addresses and phone numbers found in the visible text
pub struct ContactExtractor;

impl Extractor for ContactExtractor {
    fn name(&self) -> &'static str {
        "contact"
    }

    fn extract(&self, document: &PageDocument) -> Fragment {
        Fragment::Contact(contact_info(&document.text))
    }
}

impl ContactExtractor {
    /// Scans free text for contact details
    ///
    /// # Example
    ///
    /// ```
    /// use site_harvester::extract::ContactExtractor;
    ///
    /// let info = ContactExtractor::scan("Contact: a@b.com, (555) 123-4567");
    /// assert_eq!(info.emails, vec!["a@b.com"]);
    /// ```
    pub fn scan(text: &str) -> ContactInfo {
        contact_info(text)
    }
}

fn contact_info(text: &str) -> ContactInfo {
    let emails: BTreeSet<String> = EMAIL
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();

    let mut seen = HashSet::new();
    let mut phones = Vec::new();
    for pattern in PHONES.iter() {
        for m in pattern.find_iter(text) {
            let phone = m.as_str().trim();
            if seen.insert(phone.to_string()) {
                phones.push(phone.to_string());
            }
        }
    }
    phones.truncate(MAX_PHONES);

    ContactInfo {
        emails: emails.into_iter().collect(),
        phones,
    }
}
