//! HTML link extraction
//!
//! This module pulls candidate hrefs out of fetched pages. Resolution and
//! filtering happen later in the crawl task; the extractor reports anchors
//! exactly as written.

use scraper::{Html, Selector};
use url::Url;

/// Source of candidate links for a fetched page
pub trait LinkExtractor: Send + Sync {
    /// Returns the raw href values found in `body`, in document order
    ///
    /// `base_url` is the page the body was fetched from. Extractors that only
    /// report raw hrefs may ignore it.
    fn extract_links(&self, body: &[u8], base_url: &Url) -> Vec<String>;
}

/// Extracts `<a href="...">` values from HTML
///
/// **Include:**
/// - every `<a>` element carrying an `href`
///
/// **Exclude:**
/// - `<a href="..." download>` (file downloads, not pages)
/// - `<link>`, `<script>`, `<img>` and other non-anchor references
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlLinkExtractor;

impl HtmlLinkExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl LinkExtractor for HtmlLinkExtractor {
    fn extract_links(&self, body: &[u8], _base_url: &Url) -> Vec<String> {
        let html = String::from_utf8_lossy(body);
        let document = Html::parse_document(&html);

        let a_selector = match Selector::parse("a[href]") {
            Ok(selector) => selector,
            Err(_) => return Vec::new(),
        };

        document
            .select(&a_selector)
            .filter(|element| element.value().attr("download").is_none())
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }
}
