//! Worker pool driving one crawl session
//!
//! The scheduler spawns `concurrency` workers that share the session's
//! frontier. Each worker loops on [`Frontier::next_claim`]:
//!
//! 1. Sleep for a random politeness delay
//! 2. Fetch the claimed URL
//! 3. Extract raw hrefs and run them through the URL rules
//! 4. Queue accepted children at `depth + 1`
//! 5. Release the claim
//!
//! Workers exit when the frontier shuts down; the scheduler returns once all
//! of them have been joined.
//!
//! [`Frontier::next_claim`]: crate::crawler::frontier::Frontier::next_claim

use crate::crawler::fetcher::{FetchResult, Fetcher};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::session::CrawlSession;
use crate::url::accept_link;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Fixed-size pool of crawl workers
pub struct Scheduler<F, E> {
    fetcher: Arc<F>,
    extractor: Arc<E>,
}

impl<F: Fetcher, E: LinkExtractor> Scheduler<F, E> {
    pub fn new(fetcher: Arc<F>, extractor: Arc<E>) -> Self {
        Self { fetcher, extractor }
    }

    /// Runs workers until the session's frontier shuts down
    ///
    /// The session must already be seeded. A worker that panics is logged,
    /// counted in the session statistics and its claim released; the
    /// remaining workers carry on.
    pub async fn run(&self, session: Arc<CrawlSession>) {
        let concurrency = session.config.concurrency.max(1);
        let mut workers = JoinSet::new();

        for worker_id in 0..concurrency {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&session),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
            ));
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(pages) => tracing::trace!("Worker exited after {} pages", pages),
                Err(e) => {
                    tracing::warn!("Crawl worker failed: {}", e);
                    session.record_worker_failure();
                }
            }
        }

        let stranded = session.frontier.queued_len();
        if stranded > 0 && !session.frontier.is_shut_down() {
            tracing::error!(
                "Every worker for {} has exited with {} URLs still queued",
                session.config.root,
                stranded
            );
        }
    }
}

async fn run_worker<F: Fetcher, E: LinkExtractor>(
    worker_id: usize,
    session: Arc<CrawlSession>,
    fetcher: Arc<F>,
    extractor: Arc<E>,
) -> u64 {
    let mut pages = 0;

    while let Some(claim) = session.frontier.next_claim().await {
        let delay = session.config.politeness_delay.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        tracing::debug!(
            "Worker {} fetching {} (depth {})",
            worker_id,
            claim.url,
            claim.depth
        );
        let result = fetcher.fetch(&claim.url).await;
        let outcome = result.outcome();
        session.record_outcome(outcome);
        log_fetch_result(&claim.url, &result);

        if let Some(body) = result.into_body() {
            if claim.depth < session.config.max_depth {
                let children = collect_children(&session, extractor.as_ref(), &body);
                let queued = session.frontier.extend(children, claim.depth + 1);
                session.record_links_queued(queued);
            }
        }

        pages += 1;
        drop(claim);
    }

    pages
}

/// Runs every raw href on a page through the URL rules
///
/// Kept synchronous: the extractor's iterator borrows the page and is never
/// held across an await.
fn collect_children<E: LinkExtractor + ?Sized>(
    session: &CrawlSession,
    extractor: &E,
    page: &str,
) -> Vec<String> {
    let root = session.root_url();
    let mut children = Vec::new();

    for href in extractor.extract(page) {
        session.record_link_found();
        match accept_link(href, root) {
            Ok(url) => {
                tracing::trace!("Accepted link {}", url);
                children.push(url);
            }
            Err(reason) => {
                tracing::trace!("Rejected link {:?}: {:?}", href, reason);
                session.record_rejection(reason);
            }
        }
    }

    children
}

fn log_fetch_result(url: &str, result: &FetchResult) {
    match result {
        FetchResult::Success {
            final_url,
            status_code,
            ..
        } => {
            if final_url != url {
                tracing::debug!("Fetched {} ({}) via redirect to {}", url, status_code, final_url);
            } else {
                tracing::debug!("Fetched {} ({})", url, status_code);
            }
        }
        FetchResult::ContentMismatch { content_type } => {
            tracing::debug!("Skipping {}: content type {}", url, content_type);
        }
        FetchResult::HttpError {
            status_code,
            outcome,
        } => {
            tracing::warn!("Fetch of {} returned HTTP {} ({})", url, status_code, outcome);
        }
        FetchResult::NetworkError { error, outcome } => {
            tracing::warn!("Fetch of {} failed: {} ({})", url, error, outcome);
        }
    }
}
