/// Page outcome definitions for reporting crawl results
///
/// Every claimed URL ends in exactly one outcome. Only `Processed` pages
/// contribute outgoing links; all other outcomes are treated as empty pages.
use std::fmt;

/// Final outcome of fetching a claimed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PageOutcome {
    /// Page was fetched and its text handed to link extraction
    Processed,

    /// Page returned HTTP 404 or 410
    DeadLink,

    /// Page returned HTTP 429
    RateLimited,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Page fetch failed for other reasons (HTTP error status, body error)
    Failed,

    /// Page Content-Type is not text
    ContentMismatch,
}

impl PageOutcome {
    /// All outcomes, in reporting order
    pub const ALL: [PageOutcome; 6] = [
        Self::Processed,
        Self::DeadLink,
        Self::RateLimited,
        Self::Unreachable,
        Self::Failed,
        Self::ContentMismatch,
    ];

    /// Returns true if this represents a successful fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents a fetch failure
    pub fn is_error(&self) -> bool {
        !self.is_success()
    }

    /// Short machine-friendly name, used in summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::DeadLink => "dead_link",
            Self::RateLimited => "rate_limited",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
            Self::ContentMismatch => "content_mismatch",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processed => "Processed",
            Self::DeadLink => "Dead Link",
            Self::RateLimited => "Rate Limited",
            Self::Unreachable => "Unreachable",
            Self::Failed => "Failed",
            Self::ContentMismatch => "Content Mismatch",
        }
    }
}

impl fmt::Display for PageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
