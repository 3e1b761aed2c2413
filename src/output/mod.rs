//! Output module for crawl sessions
//!
//! This module turns a finished [`CrawlSessionResult`](crate::model::CrawlSessionResult)
//! into something a person can read:
//! - A pretty-printed JSON dump that can be loaded back
//! - One Markdown file per successfully crawled page
//! - A console summary of results and analytics

mod json;
mod markdown;
mod summary;

pub use json::{json_path, load_session, save_session};
pub use markdown::{markdown_filename, render_page_markdown, safe_title, write_markdown_dir};
pub use summary::{format_summary, print_summary, truncated_json};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
