//! Crawler module for page fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - Page fetching backends behind the `PageFetcher` trait
//! - Link, metadata, structured data and table extraction
//! - Main-content detection
//! - The breadth-first domain crawler and its frontier

mod content;
mod domain;
mod fetcher;
mod frontier;
mod page;
mod parser;
mod structured;

pub use content::{ContentExtractor, LargestTextBlock};
pub use domain::{CrawlLimits, DomainCrawler};
pub use fetcher::{
    build_http_client, is_html_content_type, FetchError, FetchErrorKind, FetchedDocument,
    HttpFetcher, PageFetcher,
};
#[cfg(feature = "browser")]
pub use fetcher::WebDriverFetcher;
pub use frontier::{Frontier, QueuedUrl};
pub use page::{build_page, fetch_page, html_to_markdown, FetchOptions};
pub use parser::{extract_links, extract_links_from, extract_title};
pub use structured::{extract_structured, extract_structured_from, extract_tables, extract_tables_from};

use crate::config::{FetcherBackend, FetcherConfig};
use crate::FathomError;
use std::sync::Arc;

/// Builds the page fetcher selected in configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn PageFetcher>)` - The configured backend
/// * `Err(FathomError)` - The HTTP client could not be built, or the
///   WebDriver backend was requested without the `browser` feature
pub fn build_fetcher(config: &FetcherConfig) -> Result<Arc<dyn PageFetcher>, FathomError> {
    match config.backend {
        FetcherBackend::Http => Ok(Arc::new(HttpFetcher::new(config)?)),
        #[cfg(feature = "browser")]
        FetcherBackend::Webdriver => Ok(Arc::new(WebDriverFetcher::new(&config.webdriver_url))),
        #[cfg(not(feature = "browser"))]
        FetcherBackend::Webdriver => Err(FathomError::Config(crate::ConfigError::Validation(
            "fetcher backend 'webdriver' requires the 'browser' feature".to_string(),
        ))),
    }
}
