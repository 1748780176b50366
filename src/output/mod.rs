//! Output module for persisting sitemaps and reporting crawl results
//!
//! This module handles:
//! - Writing each finished sitemap through a [`Sink`]
//! - Recording per-session crawl statistics
//! - Generating markdown summaries of a batch run

mod markdown;
pub mod stats;
mod text_file;
mod traits;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_statistics, CrawlStatistics};
pub use text_file::{sitemap_file_name, TextFileSink};
pub use traits::{BatchSummary, OutputError, OutputResult, Sink, SiteSummary};
