//! Crawler coordinator - per-site and batch orchestration
//!
//! This module ties the crawl engine to its surroundings:
//! - [`crawl_site`] runs one bounded crawl session to completion
//! - [`Coordinator`] crawls a list of roots one after another, persists each
//!   sitemap through a [`Sink`] and isolates failures per root

use crate::config::{Config, CrawlConfig, CrawlerConfig, PolitenessDelay};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{AnchorExtractor, LinkExtractor};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::session::{CrawlReport, CrawlSession};
use crate::output::{BatchSummary, Sink, SiteSummary, TextFileSink};
use std::path::PathBuf;
use std::sync::Arc;

/// Crawls one site from its root until the frontier is exhausted
///
/// Terminates when no work is queued or in flight, when the request budget is
/// spent, or when the depth limit leaves nothing to expand. Fetch failures are
/// recorded in the report; they never abort the session.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use sumi_sitemap::config::{CrawlConfig, CrawlerConfig, UserAgentConfig};
/// use sumi_sitemap::crawler::{crawl_site, AnchorExtractor, HttpFetcher};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let crawler = CrawlerConfig::default();
/// let config = CrawlConfig::for_root("http://example.com", &crawler)?;
/// let fetcher = HttpFetcher::new(&UserAgentConfig::default(), crawler.request_timeout())?;
///
/// let report = crawl_site(config, Arc::new(fetcher), Arc::new(AnchorExtractor)).await;
/// println!("{} URLs", report.sitemap.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl_site<F, E>(config: CrawlConfig, fetcher: Arc<F>, extractor: Arc<E>) -> CrawlReport
where
    F: Fetcher,
    E: LinkExtractor,
{
    tracing::info!(
        "Crawling {} (max depth {}, {} workers, budget {} requests)",
        config.root,
        config.max_depth,
        config.concurrency,
        config.max_requests
    );

    let session = Arc::new(CrawlSession::new(config));
    Scheduler::new(fetcher, extractor)
        .run(Arc::clone(&session))
        .await;
    let report = session.finish();

    tracing::info!(
        "Finished {}: {} URLs, {} requests in {:.2}s",
        report.root,
        report.sitemap.len(),
        report.statistics.requests_used,
        report.statistics.elapsed.as_secs_f64()
    );
    report
}

/// Main crawler coordinator structure
///
/// Holds everything shared across the roots of a batch: crawler settings,
/// the fetcher, the link extractor and the sink.
pub struct Coordinator<S = TextFileSink, F = HttpFetcher, E = AnchorExtractor> {
    crawler: CrawlerConfig,
    fetcher: Arc<F>,
    extractor: Arc<E>,
    sink: S,
    politeness_delay: Option<PolitenessDelay>,
    config_hash: Option<String>,
}

impl Coordinator {
    /// Creates a coordinator for a loaded configuration
    ///
    /// Uses an HTTP fetcher with the configured user agent and timeout, the
    /// anchor-tag extractor, and writes sitemaps into `output.directory`.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(SitemapError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> crate::Result<Self> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.crawler.request_timeout())?;
        Ok(Self::with_parts(
            config.crawler.clone(),
            fetcher,
            AnchorExtractor,
            TextFileSink::new(&config.output.directory),
        ))
    }
}

impl<S: Sink, F: Fetcher, E: LinkExtractor> Coordinator<S, F, E> {
    /// Creates a coordinator from explicit collaborators
    pub fn with_parts(crawler: CrawlerConfig, fetcher: F, extractor: E, sink: S) -> Self {
        Self {
            crawler,
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            sink,
            politeness_delay: None,
            config_hash: None,
        }
    }

    /// Overrides the configured politeness delay for every root
    pub fn with_politeness_delay(mut self, delay: PolitenessDelay) -> Self {
        self.politeness_delay = Some(delay);
        self
    }

    /// Records the configuration hash in batch summaries
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Crawls a single root and persists its sitemap
    ///
    /// # Returns
    ///
    /// * `Ok((CrawlReport, PathBuf))` - The report and where the sitemap went
    /// * `Err(SitemapError::InvalidRoot)` - The root is not a valid absolute URL
    /// * `Err(SitemapError::Output)` - The sink failed to persist the sitemap
    pub async fn crawl_root(&self, root: &str) -> crate::Result<(CrawlReport, PathBuf)> {
        let mut config = CrawlConfig::for_root(root, &self.crawler)?;
        if let Some(delay) = self.politeness_delay {
            config = config.with_politeness_delay(delay);
        }
        let root_url = config.root_url.clone();

        let report = crawl_site(config, Arc::clone(&self.fetcher), Arc::clone(&self.extractor)).await;
        let path = self.sink.persist(&root_url, &report.sitemap)?;
        tracing::info!("Sitemap for {} written to {}", report.root, path.display());

        Ok((report, path))
    }

    /// Crawls every root in order
    pub async fn run(&self, roots: &[String]) -> BatchSummary {
        self.run_with(roots, |_| {}).await
    }

    /// Crawls every root in order, reporting each site as it completes
    ///
    /// A root that fails is logged and recorded; the remaining roots still
    /// run.
    pub async fn run_with<C>(&self, roots: &[String], mut on_site: C) -> BatchSummary
    where
        C: FnMut(&SiteSummary),
    {
        let mut summary = BatchSummary::new();
        summary.config_hash = self.config_hash.clone();
        tracing::info!("Starting batch of {} sites", roots.len());

        for (index, root) in roots.iter().enumerate() {
            tracing::info!("Site {}/{}: {}", index + 1, roots.len(), root);

            let site = match self.crawl_root(root).await {
                Ok((report, path)) => SiteSummary::completed(report.root, path, report.statistics),
                Err(e) => {
                    tracing::error!("Failed to crawl {}: {}", root, e);
                    SiteSummary::failed(root.as_str(), e)
                }
            };

            on_site(&site);
            summary.sites.push(site);
        }

        summary.finish();
        tracing::info!(
            "Batch finished: {} succeeded, {} failed",
            summary.sites_succeeded(),
            summary.sites_failed()
        );
        summary
    }
}
