//! Output traits and types
//!
//! This module defines the [`Sink`] interface that receives a finished
//! sitemap, and the data structures summarizing a batch of crawls.

use crate::output::stats::CrawlStatistics;
use crate::state::PageOutcome;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for a completed sitemap
///
/// Implementations must be thread-safe.
pub trait Sink: Send + Sync {
    /// Persists the ordered visited list of one crawl
    ///
    /// # Arguments
    ///
    /// * `root` - The root URL the crawl started from
    /// * `sitemap` - Visited URLs in first-claim order
    ///
    /// # Returns
    ///
    /// Where the sitemap was written
    fn persist(&self, root: &Url, sitemap: &[String]) -> OutputResult<PathBuf>;
}

/// Result of crawling one root within a batch
#[derive(Debug, Clone)]
pub struct SiteSummary {
    pub root: String,

    /// Where the sitemap was written, when the crawl and the write succeeded
    pub sitemap_path: Option<PathBuf>,

    pub statistics: Option<CrawlStatistics>,

    /// Error message for a failed root
    pub error: Option<String>,
}

impl SiteSummary {
    pub fn completed(root: impl Into<String>, sitemap_path: PathBuf, statistics: CrawlStatistics) -> Self {
        Self {
            root: root.into(),
            sitemap_path: Some(sitemap_path),
            statistics: Some(statistics),
            error: None,
        }
    }

    pub fn failed(root: impl Into<String>, error: impl ToString) -> Self {
        Self {
            root: root.into(),
            sitemap_path: None,
            statistics: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a batch run over several roots
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// SHA-256 of the configuration file, when known
    pub config_hash: Option<String>,

    pub sites: Vec<SiteSummary>,
}

impl BatchSummary {
    /// Creates an empty summary starting now
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            config_hash: None,
            sites: Vec::new(),
        }
    }

    /// Marks the batch finished now
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    pub fn sites_succeeded(&self) -> usize {
        self.sites.iter().filter(|s| s.is_success()).count()
    }

    pub fn sites_failed(&self) -> usize {
        self.sites.len() - self.sites_succeeded()
    }

    fn statistics(&self) -> impl Iterator<Item = &CrawlStatistics> {
        self.sites.iter().filter_map(|s| s.statistics.as_ref())
    }

    /// Pages visited across all completed sites
    pub fn total_pages(&self) -> u64 {
        self.statistics().map(|s| s.pages_visited).sum()
    }

    /// Pages with the given outcome across all completed sites
    pub fn total_outcome(&self, outcome: PageOutcome) -> u64 {
        self.statistics().map(|s| s.outcome_count(outcome)).sum()
    }

    pub fn total_links(&self) -> u64 {
        self.statistics().map(|s| s.links_found).sum()
    }

    /// Panicked workers across all completed sites
    pub fn total_workers_failed(&self) -> u64 {
        self.statistics().map(|s| s.workers_failed).sum()
    }

    pub fn total_errors(&self) -> u64 {
        self.statistics().map(|s| s.error_count()).sum()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (self.total_outcome(PageOutcome::Processed) as f64 / total as f64) * 100.0
    }

    /// Returns the error rate as a percentage
    pub fn error_rate(&self) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (self.total_errors() as f64 / total as f64) * 100.0
    }
}

impl Default for BatchSummary {
    fn default() -> Self {
        Self::new()
    }
}
