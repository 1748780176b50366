use crate::url::domain::extract_authority;
use crate::{UrlError, UrlResult};
use url::Url;

/// Schemes accepted as already-absolute links
const ABSOLUTE_PREFIXES: &[&str] = &["http://", "https://"];

/// Returns true iff the string parses into an absolute URL with both a
/// scheme and a host
///
/// Malformed strings return false; this never panics.
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::is_valid_absolute_url;
///
/// assert!(is_valid_absolute_url("http://example.com/about"));
/// assert!(!is_valid_absolute_url("/about"));
/// assert!(!is_valid_absolute_url("mailto:someone@example.com"));
/// ```
pub fn is_valid_absolute_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => !parsed.scheme().is_empty() && extract_authority(&parsed).is_some(),
        Err(_) => false,
    }
}

/// Returns true iff `url` has exactly the same authority (host and port) as `root_url`
///
/// There is no subdomain or scheme relaxation: `blog.example.com` is out of
/// scope for `example.com`. Unparseable input on either side is out of scope.
///
/// # Examples
///
/// ```
/// use sumi_sitemap::url::is_same_origin;
///
/// assert!(is_same_origin("https://example.com/a", "http://example.com"));
/// assert!(!is_same_origin("http://blog.example.com/", "http://example.com"));
/// ```
pub fn is_same_origin(url: &str, root_url: &str) -> bool {
    let (Ok(url), Ok(root)) = (Url::parse(url), Url::parse(root_url)) else {
        return false;
    };

    match (extract_authority(&url), extract_authority(&root)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Normalizes a discovered href against the crawl root
///
/// # Rules
///
/// 1. Surrounding whitespace is trimmed
/// 2. `/`-prefixed hrefs are resolved against `root` into an absolute URL
/// 3. `http://` and `https://` hrefs are returned unchanged
/// 4. Everything else is rejected: `mailto:`, `javascript:`, fragment-only,
///    empty, and relative hrefs without a leading slash
///
/// The result is not yet known to be valid or in scope; callers still apply
/// [`is_valid_absolute_url`] and [`is_same_origin`].
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_sitemap::url::normalize_href;
///
/// let root = Url::parse("http://example.com").unwrap();
/// assert_eq!(normalize_href("/about", &root).unwrap(), "http://example.com/about");
/// assert_eq!(normalize_href("http://other.com/x", &root).unwrap(), "http://other.com/x");
/// assert!(normalize_href("javascript:void(0)", &root).is_err());
/// ```
pub fn normalize_href(raw_href: &str, root: &Url) -> UrlResult<String> {
    let href = raw_href.trim();

    if href.starts_with('/') {
        return root
            .join(href)
            .map(|absolute| absolute.to_string())
            .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)));
    }

    if has_absolute_prefix(href) {
        return Ok(href.to_string());
    }

    Err(UrlError::Rejected(href.to_string()))
}

/// Checks for an `http://` or `https://` prefix, ignoring ASCII case
fn has_absolute_prefix(href: &str) -> bool {
    ABSOLUTE_PREFIXES.iter().any(|prefix| {
        href.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
