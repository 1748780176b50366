//! State module for reporting crawl progress
//!
//! - `PageOutcome`: how the fetch of a claimed page ended (processed, dead link, unreachable, etc.)

mod page_state;

pub use page_state::PageOutcome;
