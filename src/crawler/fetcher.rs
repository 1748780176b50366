//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests bounded by the configured timeout
//! - Lossy decoding of page bodies
//! - Classification of every response into a [`PageOutcome`]
//!
//! Failures are returned as [`FetchResult`] values, never as errors: a page
//! that could not be fetched simply contributes no links.

use crate::config::UserAgentConfig;
use crate::state::PageOutcome;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched a textual page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value (empty when absent)
        content_type: String,
        /// Page body, invalid byte sequences replaced
        body: String,
    },

    /// Page is not text (Content-Type mismatch)
    ContentMismatch {
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// The HTTP status code
        status_code: u16,
        /// The outcome this status maps to
        outcome: PageOutcome,
    },

    /// Network error (connection refused, timeout, body read failure, etc.)
    NetworkError {
        /// Error description
        error: String,
        /// The outcome this error maps to
        outcome: PageOutcome,
    },
}

impl FetchResult {
    /// The page outcome recorded for this result
    pub fn outcome(&self) -> PageOutcome {
        match self {
            FetchResult::Success { .. } => PageOutcome::Processed,
            FetchResult::ContentMismatch { .. } => PageOutcome::ContentMismatch,
            FetchResult::HttpError { outcome, .. } | FetchResult::NetworkError { outcome, .. } => {
                *outcome
            }
        }
    }

    /// Page text, if the fetch produced any
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Retrieves page text for a URL
///
/// Implementations must bound every call in time and must not panic on
/// network failures.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult> + Send;
}

/// [`Fetcher`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher identifying itself with `user_agent`
    pub fn new(user_agent: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, timeout)?,
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        fetch_url(&self.client, url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed for one request, body included
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_sitemap::config::UserAgentConfig;
/// use sumi_sitemap::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiSitemap".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
///     contact_email: Some("admin@example.com".to_string()),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(5)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the response
///
/// # Classification
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | 2xx, textual or missing Content-Type | Processed |
/// | 2xx, other Content-Type | ContentMismatch |
/// | HTTP 404 / 410 | DeadLink |
/// | HTTP 429 | RateLimited |
/// | Other non-2xx | Failed |
/// | Timeout / connection error | Unreachable |
/// | Other transport or body error | Failed |
///
/// No request is retried.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_transport_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
            outcome: classify_status(status),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_textual_content_type(&content_type) {
        return FetchResult::ContentMismatch { content_type };
    }

    // text() replaces invalid sequences instead of failing
    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) => classify_transport_error(&e),
    }
}

/// Maps a non-success status to its outcome
pub fn classify_status(status: StatusCode) -> PageOutcome {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => PageOutcome::DeadLink,
        StatusCode::TOO_MANY_REQUESTS => PageOutcome::RateLimited,
        _ => PageOutcome::Failed,
    }
}

fn classify_transport_error(e: &reqwest::Error) -> FetchResult {
    if e.is_timeout() {
        FetchResult::NetworkError {
            error: "Request timeout".to_string(),
            outcome: PageOutcome::Unreachable,
        }
    } else if e.is_connect() {
        FetchResult::NetworkError {
            error: format!("Connection failed: {}", e),
            outcome: PageOutcome::Unreachable,
        }
    } else {
        FetchResult::NetworkError {
            error: e.to_string(),
            outcome: PageOutcome::Failed,
        }
    }
}

/// Whether a Content-Type header denotes text worth scanning for links
///
/// An absent header counts as text.
pub fn is_textual_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    mime.is_empty()
        || mime.starts_with("text/")
        || mime.ends_with("+xml")
        || mime == "application/xml"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: Some("https://example.com/about".to_string()),
            contact_email: Some("admin@example.com".to_string()),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config, Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_fetcher_new() {
        let fetcher = HttpFetcher::new(&create_test_config(), Duration::from_secs(1));
        assert!(fetcher.is_ok());
    }

    #[test]
    fn test_textual_content_types() {
        assert!(is_textual_content_type("text/html"));
        assert!(is_textual_content_type("text/html; charset=utf-8"));
        assert!(is_textual_content_type("TEXT/PLAIN"));
        assert!(is_textual_content_type("application/xhtml+xml"));
        assert!(is_textual_content_type("application/xml"));
        assert!(is_textual_content_type(""));
    }

    #[test]
    fn test_non_textual_content_types() {
        assert!(!is_textual_content_type("application/pdf"));
        assert!(!is_textual_content_type("image/png"));
        assert!(!is_textual_content_type("application/octet-stream"));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND), PageOutcome::DeadLink);
        assert_eq!(classify_status(StatusCode::GONE), PageOutcome::DeadLink);
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            PageOutcome::RateLimited
        );
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            PageOutcome::Failed
        );
        assert_eq!(classify_status(StatusCode::FORBIDDEN), PageOutcome::Failed);
    }

    #[test]
    fn test_fetch_result_outcome_and_body() {
        let ok = FetchResult::Success {
            final_url: "http://example.com/".to_string(),
            status_code: 200,
            content_type: "text/html".to_string(),
            body: "<a href=\"/x\">x</a>".to_string(),
        };
        assert_eq!(ok.outcome(), PageOutcome::Processed);
        assert_eq!(ok.into_body().as_deref(), Some("<a href=\"/x\">x</a>"));

        let dead = FetchResult::HttpError {
            status_code: 404,
            outcome: PageOutcome::DeadLink,
        };
        assert_eq!(dead.outcome(), PageOutcome::DeadLink);
        assert!(dead.into_body().is_none());

        let mismatch = FetchResult::ContentMismatch {
            content_type: "image/png".to_string(),
        };
        assert_eq!(mismatch.outcome(), PageOutcome::ContentMismatch);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let client = build_http_client(&create_test_config(), Duration::from_secs(2)).unwrap();
        // Port 9 on localhost is closed on any sane test host
        let result = fetch_url(&client, "http://127.0.0.1:9/").await;
        assert!(result.into_body().is_none());
    }
}
