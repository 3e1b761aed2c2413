//! Fathom: search-driven, domain-scoped web crawling with structured extraction
//!
//! This crate runs a keyword search, then crawls each result's domain
//! breadth-first within depth and page budgets, pulling out links, metadata,
//! JSON-LD, social-card tags and HTML tables from every page it visits.

pub mod config;
pub mod crawler;
pub mod model;
pub mod notify;
pub mod orchestrator;
pub mod output;
pub mod search;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Fathom operations
#[derive(Debug, Error)]
pub enum FathomError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Notification error: {0}")]
    Notify(#[from] notify::NotifyError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Crawl session cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Fathom operations
pub type Result<T> = std::result::Result<T, FathomError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{DomainCrawler, PageFetcher};
pub use model::{Analysis, CrawlSessionResult, DomainCrawlResult, PageResult, SearchResult};
pub use orchestrator::Orchestrator;
pub use state::CrawlState;
pub use crate::url::{domain, resolve_link, same_domain, validate};
