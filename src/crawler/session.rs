//! Per-root crawl session state and its final report

use crate::config::CrawlConfig;
use crate::crawler::frontier::Frontier;
use crate::output::CrawlStatistics;
use crate::state::PageOutcome;
use crate::url::LinkRejection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use url::Url;

/// Everything shared by the workers of one crawl
///
/// Created per root URL with the root already queued at depth 0, and
/// reported through [`CrawlSession::finish`] once every worker has exited.
#[derive(Debug)]
pub struct CrawlSession {
    pub config: CrawlConfig,
    pub frontier: Frontier,
    counters: SessionCounters,
    started: Instant,
}

#[derive(Debug, Default)]
struct SessionCounters {
    links_found: AtomicU64,
    links_queued: AtomicU64,
    links_rejected: AtomicU64,
    workers_failed: AtomicU64,
    rejections: Mutex<HashMap<LinkRejection, u64>>,
    outcomes: Mutex<HashMap<PageOutcome, u64>>,
}

impl CrawlSession {
    /// Creates a session and seeds its frontier with the root
    pub fn new(config: CrawlConfig) -> Self {
        let frontier = Frontier::new(config.max_depth, config.max_requests);
        frontier.push(config.root.clone(), 0);

        Self {
            config,
            frontier,
            counters: SessionCounters::default(),
            started: Instant::now(),
        }
    }

    pub fn root_url(&self) -> &Url {
        &self.config.root_url
    }

    /// Records how the fetch of a claimed page ended
    pub fn record_outcome(&self, outcome: PageOutcome) {
        let mut outcomes = self
            .counters
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Records one raw href seen on a page
    pub fn record_link_found(&self) {
        self.counters.links_found.fetch_add(1, Ordering::Relaxed);
    }

    /// Records child links handed to the frontier
    pub fn record_links_queued(&self, count: usize) {
        self.counters
            .links_queued
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Records a link dropped by the URL rules
    pub fn record_rejection(&self, reason: LinkRejection) {
        self.counters.links_rejected.fetch_add(1, Ordering::Relaxed);
        let mut rejections = self
            .counters
            .rejections
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *rejections.entry(reason).or_insert(0) += 1;
    }

    /// Records a worker that ended without reaching frontier shutdown
    pub fn record_worker_failure(&self) {
        self.counters.workers_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Builds the session report
    ///
    /// Called once every worker has exited. The sitemap is the visited set
    /// in the order URLs were claimed.
    pub fn finish(&self) -> CrawlReport {
        let sitemap = self.frontier.visited();
        let counters = &self.counters;

        let statistics = CrawlStatistics {
            pages_visited: sitemap.len() as u64,
            requests_used: self.frontier.request_count(),
            max_requests: self.config.max_requests,
            links_found: counters.links_found.load(Ordering::Relaxed),
            links_queued: counters.links_queued.load(Ordering::Relaxed),
            links_rejected: counters.links_rejected.load(Ordering::Relaxed),
            rejections: counters
                .rejections
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            pages_by_outcome: counters
                .outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            workers_failed: counters.workers_failed.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        };

        CrawlReport {
            root: self.config.root.clone(),
            sitemap,
            statistics,
        }
    }
}

/// Result of one completed crawl session
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Root URL as configured
    pub root: String,

    /// Distinct in-scope URLs in the order they were first claimed
    pub sitemap: Vec<String>,

    pub statistics: CrawlStatistics,
}
