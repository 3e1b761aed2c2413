//! Crawl state definitions for tracking one URL through a domain crawl

use crate::FathomError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current state of a URL in a domain crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    // ===== Active States =====
    /// URL is waiting in the frontier
    Queued,

    /// URL is currently being fetched
    Fetching,

    // ===== Outcome States =====
    /// Page was fetched and extraction ran
    Extracted,

    /// Fetch failed (transport, timeout, HTTP status, content mismatch)
    Failed,

    // ===== Final State =====
    /// Result recorded and any children enqueued
    Done,
}

impl CrawlState {
    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Extracted)
                | (Self::Fetching, Self::Failed)
                | (Self::Extracted, Self::Done)
                | (Self::Failed, Self::Done)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlState)` - The new state
    /// * `Err(FathomError::InvalidTransition)` - `next` is not reachable from here
    pub fn transition(self, next: CrawlState) -> Result<CrawlState, FathomError> {
        if self.can_transition_to(next) {
            tracing::trace!("crawl state {} -> {}", self, next);
            Ok(next)
        } else {
            Err(FathomError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::Failed => "failed",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
