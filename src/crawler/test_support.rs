//! In-memory fetchers and sinks for crawler unit tests

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::output::{OutputError, OutputResult, Sink};
use crate::state::PageOutcome;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Serves pages from a map; unknown URLs answer 404
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    latency: Duration,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.to_string());
        self
    }

    /// Delays every response, so workers overlap
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    fn respond(&self, url: &str) -> FetchResult {
        *self.fetches.lock().unwrap().entry(url.to_string()).or_insert(0) += 1;
        match self.pages.get(url) {
            Some(body) => FetchResult::Success {
                final_url: url.to_string(),
                status_code: 200,
                content_type: "text/html".to_string(),
                body: body.clone(),
            },
            None => FetchResult::HttpError {
                status_code: 404,
                outcome: PageOutcome::DeadLink,
            },
        }
    }
}

impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let result = self.respond(url);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        result
    }
}

/// Wraps a [`StaticFetcher`] and panics when asked for one URL
#[derive(Debug)]
pub struct PanickingFetcher {
    inner: StaticFetcher,
    poison: String,
}

impl PanickingFetcher {
    pub fn new(inner: StaticFetcher, poison: &str) -> Self {
        Self {
            inner,
            poison: poison.to_string(),
        }
    }
}

impl Fetcher for PanickingFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        if url == self.poison {
            panic!("fetcher exploded on {}", url);
        }
        self.inner.fetch(url).await
    }
}

/// Keeps sitemaps in memory, keyed by root URL
#[derive(Debug, Default)]
pub struct MemorySink {
    sitemaps: Mutex<HashMap<String, Vec<String>>>,
    fail: bool,
}

impl MemorySink {
    /// A sink whose every write fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sitemap(&self, root: &str) -> Option<Vec<String>> {
        self.sitemaps.lock().unwrap().get(root).cloned()
    }
}

impl Sink for MemorySink {
    fn persist(&self, root: &Url, sitemap: &[String]) -> OutputResult<PathBuf> {
        if self.fail {
            return Err(OutputError::Write("sink unavailable".to_string()));
        }
        self.sitemaps
            .lock()
            .unwrap()
            .insert(root.to_string(), sitemap.to_vec());
        Ok(PathBuf::from(format!("memory/{}", root)))
    }
}
