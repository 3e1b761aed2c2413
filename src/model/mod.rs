//! Result types produced by a crawl session
//!
//! Everything here is plain data: created once by the component that produced
//! it, never mutated afterwards, and serializable to the JSON dump format.

mod page;
mod session;

pub use page::{PageMetadata, PageResult, StructuredData, Table};
pub use session::{Analysis, CrawlSessionResult, DomainCrawlResult, DomainInsight, SearchResult};
