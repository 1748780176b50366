//! URL rules for Sumi-Sitemap
//!
//! Pure functions deciding which discovered links the crawler may follow:
//! absolute-URL validity, same-origin scope, and normalization of raw hrefs
//! against the crawl root. None of these functions panic on malformed input.

mod domain;
mod normalize;

pub use domain::{extract_authority, extract_domain};
pub use normalize::{is_same_origin, is_valid_absolute_url, normalize_href};

use ::url::Url;

/// Reason a discovered link was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkRejection {
    /// Neither root-relative nor absolute http(s)
    Unsupported,
    /// Normalized, but not an absolute URL with a host
    Invalid,
    /// Valid, but on a different authority than the root
    OutOfScope,
}

impl LinkRejection {
    pub const ALL: [LinkRejection; 3] = [
        LinkRejection::Unsupported,
        LinkRejection::Invalid,
        LinkRejection::OutOfScope,
    ];

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            LinkRejection::Unsupported => "Unsupported href",
            LinkRejection::Invalid => "Invalid URL",
            LinkRejection::OutOfScope => "Other origin",
        }
    }
}

/// Applies every URL rule to a raw href, in order
///
/// Returns the normalized absolute URL when the link may enter the frontier.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sitemap::url::{accept_link, LinkRejection};
///
/// let root = Url::parse("http://example.com").unwrap();
/// assert_eq!(accept_link("/about", &root), Ok("http://example.com/about".to_string()));
/// assert_eq!(accept_link("http://other.com/x", &root), Err(LinkRejection::OutOfScope));
/// assert_eq!(accept_link("mailto:a@example.com", &root), Err(LinkRejection::Unsupported));
/// ```
pub fn accept_link(raw_href: &str, root: &Url) -> Result<String, LinkRejection> {
    let normalized = normalize_href(raw_href, root).map_err(|_| LinkRejection::Unsupported)?;

    if !is_valid_absolute_url(&normalized) {
        return Err(LinkRejection::Invalid);
    }

    if !is_same_origin(&normalized, root.as_str()) {
        return Err(LinkRejection::OutOfScope);
    }

    Ok(normalized)
}
