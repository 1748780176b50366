//! Sumi-Sitemap main entry point
//!
//! This is the command-line interface for the Sumi-Sitemap generator.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use sumi_sitemap::config::{load_config_with_hash, Config};
use sumi_sitemap::crawler::Coordinator;
use sumi_sitemap::output::{generate_markdown_summary, print_statistics, SiteSummary};
use tracing_subscriber::EnvFilter;

/// Sumi-Sitemap: a polite same-origin sitemap generator
///
/// Sumi-Sitemap crawls each configured site from its root URL, stays on the
/// root's origin, honors a depth limit and a request budget, and writes the
/// discovered URLs to one `<host>_sitemap.txt` file per site.
#[derive(Parser, Debug)]
#[command(name = "sumi-sitemap")]
#[command(version)]
#[command(about = "A polite same-origin sitemap generator", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl this root instead of the configured sites (repeatable)
    #[arg(long = "root", value_name = "URL")]
    roots: Vec<String>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let roots = if cli.roots.is_empty() {
        config.roots()
    } else {
        cli.roots.clone()
    };
    if roots.is_empty() {
        bail!("No sites to crawl: add a [[site]] entry or pass --root <URL>");
    }

    if cli.dry_run {
        handle_dry_run(&config, &roots);
        return Ok(());
    }

    handle_crawl(&config, config_hash, &roots, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sitemap=info,warn"),
            1 => EnvFilter::new("sumi_sitemap=debug,info"),
            2 => EnvFilter::new("sumi_sitemap=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, roots: &[String]) {
    println!("=== Sumi-Sitemap Dry Run ===\n");

    let crawler = &config.crawler;
    println!("Crawler Configuration:");
    println!("  Max depth: {}", crawler.max_depth);
    println!("  Concurrency: {}", crawler.concurrency);
    println!("  Max requests per site: {}", crawler.max_requests);
    println!(
        "  Politeness delay: {}s - {}s",
        crawler.politeness_delay_min, crawler.politeness_delay_max
    );
    println!("  Request timeout: {}s", crawler.request_timeout);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory.display());
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path.display()),
        None => println!("  Summary: (none)"),
    }

    println!("\nSites ({}):", roots.len());
    for root in roots {
        println!("  - {}", root);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} sites", roots.len());
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    config_hash: String,
    roots: &[String],
    quiet: bool,
) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config)
        .context("Failed to build HTTP client")?
        .with_config_hash(config_hash);

    let summary = coordinator
        .run_with(roots, |site| {
            if !quiet {
                print_site(site);
            }
        })
        .await;

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        tracing::info!("Summary written to {}", path.display());
    }

    if summary.sites_succeeded() == 0 {
        bail!("All {} sites failed to crawl", summary.sites.len());
    }
    Ok(())
}

/// Prints the outcome of one site as soon as it completes
fn print_site(site: &SiteSummary) {
    match (&site.statistics, &site.sitemap_path) {
        (Some(stats), Some(path)) => {
            print_statistics(&site.root, stats);
            println!("Sitemap: {}\n", path.display());
        }
        _ => {
            println!(
                "✗ Failed to crawl {}: {}\n",
                site.root,
                site.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
