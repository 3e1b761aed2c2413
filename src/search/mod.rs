//! Search module for turning a query into seed URLs
//!
//! The orchestrator only sees the [`SearchClient`] trait. Knowledge of a
//! particular engine's markup lives in its implementation module.

mod duckduckgo;

pub use duckduckgo::{extract_result_url, parse_results, DuckDuckGoClient};

use crate::model::SearchResult;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while talking to a search backend
///
/// These never reach the orchestrator: [`SearchClient::search`] logs them
/// and returns an empty list.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Search endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse search results: {0}")]
    Parse(String),
}

/// A keyword search backend
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns at most `num_results` hits, or an empty list on any failure
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult>;
}
