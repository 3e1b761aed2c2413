//! URL handling module for Fathom
//!
//! This module provides seed validation, authority extraction, same-domain
//! checks and href resolution for the crawler.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::{domain, same_domain};
pub use normalize::{parse_valid, validate, visit_key};
pub use resolve::{has_denied_extension, resolve_link, DENIED_EXTENSIONS};
