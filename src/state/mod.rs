//! State module for tracking per-page crawl progress
//!
//! Every URL a domain crawl touches moves through `CrawlState`:
//! `Queued → Fetching → {Extracted, Failed} → Done`.

mod crawl_state;

// Re-export main types
pub use crawl_state::CrawlState;
