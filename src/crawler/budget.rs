//! Global request budget of a crawl session

/// Counter enforcing the per-session fetch cap
///
/// The budget is not synchronized on its own: it lives inside the frontier's
/// critical section so that spending it is atomic with the visited check.
#[derive(Debug, Clone)]
pub struct RequestBudget {
    max_requests: u32,
    request_count: u32,
}

impl RequestBudget {
    pub fn new(max_requests: u32) -> Self {
        Self {
            max_requests,
            request_count: 0,
        }
    }

    /// Spends one request if any remain
    ///
    /// Returns false, leaving the count unchanged, once the cap is reached.
    pub fn try_spend(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.request_count += 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.request_count >= self.max_requests
    }

    /// Requests spent so far
    pub fn used(&self) -> u32 {
        self.request_count
    }

    pub fn remaining(&self) -> u32 {
        self.max_requests - self.request_count
    }

    pub fn limit(&self) -> u32 {
        self.max_requests
    }
}
