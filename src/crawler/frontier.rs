//! Shared crawl frontier: work queue, visited set, budget and termination
//!
//! All mutable crawl state shared between workers lives behind one mutex so
//! that the visited check, the depth check and the budget spend happen as a
//! single step ([`Frontier::try_claim`]). The lock is only held for queue and
//! counter updates, never across a fetch.
//!
//! # Termination
//!
//! A worker that finds the queue empty cannot simply stop: another worker may
//! be mid-fetch and about to push children. Every successful claim therefore
//! increments a pending count that is released when the claim guard drops.
//! The frontier shuts down, once and for every worker, when the queue is empty
//! and either no claim is pending or the budget is spent.

use crate::crawler::budget::RequestBudget;
use std::collections::{HashSet, VecDeque};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// A URL waiting to be claimed, tagged with its link depth from the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

#[derive(Debug)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    /// Visited URLs in claim order; becomes the sitemap
    visited_order: Vec<String>,
    budget: RequestBudget,
    /// Claims handed out and not yet released
    pending: usize,
    shutdown: bool,
}

impl FrontierState {
    fn try_claim(&mut self, url: &str, depth: u32, max_depth: u32) -> bool {
        if !self.can_enqueue(url, depth, max_depth) || !self.budget.try_spend() {
            return false;
        }
        self.visited.insert(url.to_string());
        self.visited_order.push(url.to_string());
        self.pending += 1;
        true
    }

    /// Whether an entry could still be claimed later
    fn can_enqueue(&self, url: &str, depth: u32, max_depth: u32) -> bool {
        !self.shutdown
            && depth <= max_depth
            && !self.budget.is_exhausted()
            && !self.visited.contains(url)
    }
}

/// The shared, depth-tagged work queue of one crawl session
#[derive(Debug)]
pub struct Frontier {
    max_depth: u32,
    state: Mutex<FrontierState>,
    wake: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    ///
    /// Seed it with [`Frontier::push`] before any worker calls
    /// [`Frontier::next_claim`]: an empty frontier with nothing pending is
    /// already terminal.
    pub fn new(max_depth: u32, max_requests: u32) -> Self {
        Self {
            max_depth,
            state: Mutex::new(FrontierState {
                queue: VecDeque::new(),
                visited: HashSet::new(),
                visited_order: Vec::new(),
                budget: RequestBudget::new(max_requests),
                pending: 0,
                shutdown: false,
            }),
            wake: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Enqueues a URL for later claiming
    ///
    /// Entries that could never be claimed (over depth, already visited,
    /// budget spent, frontier shut down) are dropped here; returns whether
    /// the entry was queued. Claiming remains the only gate before a fetch.
    pub fn push(&self, url: impl Into<String>, depth: u32) -> bool {
        let url = url.into();
        let queued = {
            let mut state = self.lock();
            if state.can_enqueue(&url, depth, self.max_depth) {
                state.queue.push_back(FrontierEntry { url, depth });
                true
            } else {
                false
            }
        };
        if queued {
            self.wake.notify_waiters();
        }
        queued
    }

    /// Enqueues a batch of sibling URLs under one lock
    ///
    /// Returns how many were queued.
    pub fn extend<I>(&self, urls: I, depth: u32) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let queued = {
            let mut state = self.lock();
            let mut queued = 0;
            for url in urls {
                if state.can_enqueue(&url, depth, self.max_depth) {
                    state.queue.push_back(FrontierEntry { url, depth });
                    queued += 1;
                }
            }
            queued
        };
        if queued > 0 {
            self.wake.notify_waiters();
        }
        queued
    }

    /// Removes and returns the oldest queued entry, without claiming it
    pub fn pop(&self) -> Option<FrontierEntry> {
        self.lock().queue.pop_front()
    }

    /// Atomically claims `url` for fetching
    ///
    /// Succeeds only if the URL is unvisited, `depth <= max_depth` and the
    /// budget has a request left; on success the URL is marked visited, one
    /// request is spent and the returned guard counts as pending work until
    /// it is dropped. On failure nothing changes.
    pub fn try_claim(&self, url: &str, depth: u32) -> Option<Claim<'_>> {
        let (claimed, exhausted) = {
            let mut state = self.lock();
            let claimed = state.try_claim(url, depth, self.max_depth);
            (claimed, state.budget.is_exhausted())
        };
        if exhausted {
            self.wake.notify_waiters();
        }
        claimed.then(|| Claim::new(self, FrontierEntry::new(url, depth)))
    }

    /// Waits for the next claimable entry
    ///
    /// Returns `None` once the crawl is over: the queue is empty and no other
    /// worker holds a claim that could still produce children, or the budget
    /// is spent. Every waiting worker observes the same shutdown.
    pub async fn next_claim(&self) -> Option<Claim<'_>> {
        loop {
            // Registered before inspecting state so a push or release between
            // the check and the await is not missed.
            let woken = self.wake.notified();
            {
                let mut state = self.lock();
                if state.shutdown {
                    return None;
                }

                while let Some(entry) = state.queue.pop_front() {
                    if state.try_claim(&entry.url, entry.depth, self.max_depth) {
                        let exhausted = state.budget.is_exhausted();
                        drop(state);
                        if exhausted {
                            self.wake.notify_waiters();
                        }
                        return Some(Claim::new(self, entry));
                    }
                    tracing::trace!("Skipping unclaimable entry {} (depth {})", entry.url, entry.depth);
                }

                if state.pending == 0 || state.budget.is_exhausted() {
                    state.shutdown = true;
                    tracing::debug!(
                        "Frontier drained: {} visited, {} requests, {} still in flight",
                        state.visited_order.len(),
                        state.budget.used(),
                        state.pending
                    );
                    drop(state);
                    self.wake.notify_waiters();
                    return None;
                }
            }
            woken.await;
        }
    }

    fn release(&self) {
        {
            let mut state = self.lock();
            state.pending = state.pending.saturating_sub(1);
        }
        self.wake.notify_waiters();
    }

    /// Number of claims currently held by workers
    pub fn active_count(&self) -> usize {
        self.lock().pending
    }

    /// Requests spent so far
    pub fn request_count(&self) -> u32 {
        self.lock().budget.used()
    }

    /// Number of entries waiting in the queue
    pub fn queued_len(&self) -> usize {
        self.lock().queue.len()
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited_order.len()
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shutdown
    }

    /// Snapshot of visited URLs in claim order
    pub fn visited(&self) -> Vec<String> {
        self.lock().visited_order.clone()
    }
}

/// Exclusive right to fetch one URL
///
/// Dereferences to the claimed [`FrontierEntry`]. Dropping the claim marks its
/// work as finished, so children must be pushed before the claim goes away.
/// A worker that panics mid-fetch still releases its claim while unwinding.
#[derive(Debug)]
pub struct Claim<'a> {
    frontier: &'a Frontier,
    entry: FrontierEntry,
}

impl<'a> Claim<'a> {
    fn new(frontier: &'a Frontier, entry: FrontierEntry) -> Self {
        Self { frontier, entry }
    }
}

impl Deref for Claim<'_> {
    type Target = FrontierEntry;

    fn deref(&self) -> &FrontierEntry {
        &self.entry
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.frontier.release();
    }
}
