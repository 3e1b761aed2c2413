use crate::model::PageResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One hit returned by the search client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Everything gathered from one seed URL's domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainCrawlResult {
    pub start_url: String,
    pub domain: String,

    /// True when crawling was attempted with a valid seed; per-page outcomes
    /// live in each [`PageResult`]
    pub success: bool,
    pub pages: Vec<PageResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DomainCrawlResult {
    /// Creates a failed result that holds no pages
    pub fn failed(start_url: impl Into<String>, error: impl Into<String>) -> Self {
        let start_url = start_url.into();
        let domain = crate::url::domain(&start_url).unwrap_or_default();
        Self {
            start_url,
            domain,
            success: false,
            pages: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Total number of tables across all pages
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }
}

/// Per-domain line of the session analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInsight {
    pub domain: String,
    pub pages_crawled: usize,
    pub tables_found: usize,
    pub has_structured_data: bool,
}

/// Aggregate numbers derived from a session's domain results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub total_domains: usize,
    pub successful_domains: usize,
    pub total_pages: usize,
    pub tables_found: usize,

    /// Number of pages with at least one kind of structured data
    pub structured_data_found: usize,
    pub domain_insights: Vec<DomainInsight>,
    pub content_summary: String,

    /// Concatenated page text, truncated
    #[serde(default)]
    pub content_excerpt: String,
}

/// Top-level result of one search-then-crawl invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlSessionResult {
    pub query: String,
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub deep_crawl_enabled: bool,
    pub search_results: Vec<SearchResult>,
    pub domain_results: Vec<DomainCrawlResult>,
    pub analysis: Analysis,
}

impl CrawlSessionResult {
    /// Creates the result returned when the search step produced nothing
    pub fn no_results(query: impl Into<String>, deep_crawl_enabled: bool) -> Self {
        Self {
            query: query.into(),
            success: false,
            error: Some("No search results found".to_string()),
            timestamp: Utc::now(),
            deep_crawl_enabled,
            search_results: Vec::new(),
            domain_results: Vec::new(),
            analysis: Analysis::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Table;

    #[test]
    fn test_failed_domain_result() {
        let result = DomainCrawlResult::failed("https://a.com/x", "Invalid URL format");
        assert!(!result.success);
        assert_eq!(result.domain, "a.com");
        assert!(result.pages.is_empty());
        assert_eq!(result.error.as_deref(), Some("Invalid URL format"));
    }

    #[test]
    fn test_failed_domain_result_with_garbage_url() {
        let result = DomainCrawlResult::failed("not a url", "Invalid URL format");
        assert_eq!(result.domain, "");
    }

    #[test]
    fn test_table_count() {
        let page = PageResult {
            success: true,
            tables: vec![Table::default(), Table::default()],
            ..Default::default()
        };
        let result = DomainCrawlResult {
            success: true,
            pages: vec![page.clone(), page],
            ..Default::default()
        };
        assert_eq!(result.table_count(), 4);
    }

    #[test]
    fn test_no_results_session() {
        let session = CrawlSessionResult::no_results("rust crawler", true);
        assert!(!session.success);
        assert_eq!(session.error.as_deref(), Some("No search results found"));
        assert!(session.search_results.is_empty());
        assert!(session.domain_results.is_empty());
    }
}
