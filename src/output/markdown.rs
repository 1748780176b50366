//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a batch run,
//! with per-site statistics, outcome breakdowns and failed roots.

use crate::output::traits::{BatchSummary, OutputResult};
use crate::state::PageOutcome;
use crate::url::LinkRejection;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary of a batch run
///
/// # Arguments
///
/// * `summary` - The batch summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &BatchSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a batch summary as markdown
pub fn format_markdown_summary(summary: &BatchSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Sitemap Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished.to_rfc3339()));
    }
    if let Some(duration) = summary.duration_seconds() {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Sites Crawled**: {}\n", summary.sites_succeeded()));
    md.push_str(&format!("- **Sites Failed**: {}\n", summary.sites_failed()));
    md.push_str(&format!("- **Total Pages**: {}\n", summary.total_pages()));
    md.push_str(&format!("- **Total Links**: {}\n", summary.total_links()));
    md.push_str(&format!("- **Total Errors**: {}\n", summary.total_errors()));
    let workers_failed = summary.total_workers_failed();
    if workers_failed > 0 {
        md.push_str(&format!("- **Failed Workers**: {} (some sites incomplete)\n", workers_failed));
    }
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", summary.success_rate()));
    md.push_str(&format!("- **Error Rate**: {:.2}%\n\n", summary.error_rate()));

    // Per-site table
    if !summary.sites.is_empty() {
        md.push_str("## Sites\n\n");
        md.push_str("| Root | Pages | Requests | Links Found | Links Rejected | Elapsed (s) | Sitemap |\n");
        md.push_str("|------|-------|----------|-------------|----------------|-------------|---------|\n");

        for site in &summary.sites {
            match (&site.statistics, &site.sitemap_path) {
                (Some(stats), Some(path)) => {
                    md.push_str(&format!(
                        "| {} | {} | {} / {} | {} | {} | {:.2} | {} |\n",
                        site.root,
                        stats.pages_visited,
                        stats.requests_used,
                        stats.max_requests,
                        stats.links_found,
                        stats.links_rejected,
                        stats.elapsed.as_secs_f64(),
                        path.display()
                    ));
                }
                _ => {
                    md.push_str(&format!("| {} | - | - | - | - | - | failed |\n", site.root));
                }
            }
        }
        md.push('\n');
    }

    // Outcome breakdown
    if summary.total_pages() > 0 {
        md.push_str("## Page Outcome Breakdown\n\n");
        md.push_str("| Outcome | Count |\n");
        md.push_str("|---------|-------|\n");
        for outcome in PageOutcome::ALL {
            md.push_str(&format!(
                "| {} | {} |\n",
                outcome.label(),
                summary.total_outcome(outcome)
            ));
        }
        md.push('\n');
    }

    // Rejected links
    let rejected: Vec<(LinkRejection, u64)> = LinkRejection::ALL
        .into_iter()
        .map(|reason| {
            let count: u64 = summary
                .sites
                .iter()
                .filter_map(|s| s.statistics.as_ref())
                .filter_map(|s| s.rejections.get(&reason))
                .sum();
            (reason, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();
    if !rejected.is_empty() {
        md.push_str("## Rejected Links\n\n");
        md.push_str("| Reason | Count |\n");
        md.push_str("|--------|-------|\n");
        for (reason, count) in rejected {
            md.push_str(&format!("| {} | {} |\n", reason.label(), count));
        }
        md.push('\n');
    }

    // Failed roots
    let failures: Vec<_> = summary.sites.iter().filter(|s| !s.is_success()).collect();
    if !failures.is_empty() {
        md.push_str("## Failed Sites\n\n");
        for site in failures {
            md.push_str(&format!(
                "- {}: {}\n",
                site.root,
                site.error.as_deref().unwrap_or("unknown error")
            ));
        }
        md.push('\n');
    }

    md
}
