//! Crawler module for bounded same-origin crawling
//!
//! This module contains the core crawling logic, including:
//! - The shared frontier with atomic claiming and termination detection
//! - The global request budget
//! - HTTP fetching and anchor-tag link extraction
//! - The worker pool that drives one crawl session
//! - Per-site and batch coordination

mod budget;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use budget::RequestBudget;
pub use coordinator::{crawl_site, Coordinator};
pub use fetcher::{
    build_http_client, classify_status, fetch_url, is_textual_content_type, FetchResult, Fetcher,
    HttpFetcher,
};
pub use frontier::{Claim, Frontier, FrontierEntry};
pub use parser::{AnchorExtractor, LinkExtractor};
pub use scheduler::Scheduler;
pub use session::{CrawlReport, CrawlSession};
