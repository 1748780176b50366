//! Per-session crawl statistics
//!
//! This module holds the counters a crawl session reports and the console
//! rendering used by the CLI.

use crate::state::PageOutcome;
use crate::url::LinkRejection;
use std::collections::HashMap;
use std::time::Duration;

/// Crawl statistics of one session
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Number of distinct URLs claimed (the sitemap length)
    pub pages_visited: u64,

    /// Requests spent against the budget
    pub requests_used: u32,

    /// The request budget of the session
    pub max_requests: u32,

    /// Raw hrefs produced by link extraction
    pub links_found: u64,

    /// Accepted links that entered the frontier
    pub links_queued: u64,

    /// Links dropped by the URL rules
    pub links_rejected: u64,

    /// Rejected links by reason
    pub rejections: HashMap<LinkRejection, u64>,

    /// Count of pages by fetch outcome
    pub pages_by_outcome: HashMap<PageOutcome, u64>,

    /// Workers that panicked; URLs still queued behind them were never claimed
    pub workers_failed: u64,

    /// Wall-clock duration of the session
    pub elapsed: Duration,
}

impl CrawlStatistics {
    pub fn outcome_count(&self, outcome: PageOutcome) -> u64 {
        self.pages_by_outcome.get(&outcome).copied().unwrap_or(0)
    }

    /// Pages whose fetch did not yield text
    pub fn error_count(&self) -> u64 {
        self.pages_by_outcome
            .iter()
            .filter(|(outcome, _)| outcome.is_error())
            .map(|(_, count)| count)
            .sum()
    }

    /// Whether every worker ran until the frontier shut down
    pub fn is_complete(&self) -> bool {
        self.workers_failed == 0
    }

    /// Whether the crawl stopped because the request budget ran out
    pub fn budget_exhausted(&self) -> bool {
        self.max_requests > 0 && self.requests_used >= self.max_requests
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `root` - The root URL the statistics belong to
/// * `stats` - The statistics to display
pub fn print_statistics(root: &str, stats: &CrawlStatistics) {
    println!("=== Crawl Statistics: {} ===\n", root);

    println!("Overview:");
    println!("  Pages visited: {}", stats.pages_visited);
    println!(
        "  Requests used: {} / {}{}",
        stats.requests_used,
        stats.max_requests,
        if stats.budget_exhausted() {
            " (budget exhausted)"
        } else {
            ""
        }
    );
    println!("  Links found: {}", stats.links_found);
    println!("  Links queued: {}", stats.links_queued);
    println!("  Links rejected: {}", stats.links_rejected);
    if !stats.is_complete() {
        println!("  Failed workers: {} (crawl incomplete)", stats.workers_failed);
    }
    println!();

    println!("Pages by Outcome:");
    for outcome in PageOutcome::ALL {
        let count = stats.outcome_count(outcome);
        if count == 0 {
            continue;
        }
        let percentage = if stats.pages_visited > 0 {
            (count as f64 / stats.pages_visited as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome.label(), count, percentage);
    }
    println!();

    if stats.links_rejected > 0 {
        println!("Rejected Links:");
        for reason in LinkRejection::ALL {
            if let Some(count) = stats.rejections.get(&reason) {
                println!("  {}: {}", reason.label(), count);
            }
        }
        println!();
    }

    println!("Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
}
