//! Configuration module for Fathom
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every key has a default, so a missing file or an empty one yields a
//! working configuration; command-line flags are applied on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use fathom::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("fathom.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherBackend, FetcherConfig, NotifyConfig, OutputConfig,
    SearchConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
