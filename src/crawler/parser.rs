//! Link extraction from raw page text
//!
//! Extraction is pattern based: anchor tags are matched in the markup as
//! text, without building a document tree. Extractors only find raw href
//! values; resolving and filtering them is left to the URL rules.

use regex::Regex;
use std::sync::LazyLock;

/// Produces the raw link targets found in a page
///
/// Implementations hold no per-page state, so one extractor is shared by
/// every worker of a crawl.
pub trait LinkExtractor: Send + Sync + 'static {
    /// Lazily yields each raw href in document order
    ///
    /// The returned iterator borrows the page text; callers drain it before
    /// their next suspension point.
    fn extract<'a>(&'a self, page: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a[^>]*href=['"]([^'"]+)['"][^>]*>"#).expect("hardcoded regex pattern is valid")
});

/// Extracts `href` values of `<a>` tags
///
/// # Example
///
/// ```
/// use sumi_sitemap::crawler::{AnchorExtractor, LinkExtractor};
///
/// let html = r#"<p><a href="/about">About</a> <a class="x" href='https://example.com/'>Home</a></p>"#;
/// let links: Vec<&str> = AnchorExtractor.extract(html).collect();
/// assert_eq!(links, vec!["/about", "https://example.com/"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorExtractor;

impl LinkExtractor for AnchorExtractor {
    fn extract<'a>(&'a self, page: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(
            ANCHOR_HREF
                .captures_iter(page)
                .filter_map(|caps| caps.get(1))
                .map(|m| m.as_str()),
        )
    }
}
