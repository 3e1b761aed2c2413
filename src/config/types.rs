use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Main configuration structure for Fathom
///
/// Every section and key is optional in the TOML file; missing values take
/// the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
    pub notify: NotifyConfig,
}

/// Crawl budgets and fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth to crawl from each seed
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages fetched per domain
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Pause between consecutive fetches within one domain (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Maximum number of domains crawled at the same time
    #[serde(rename = "max-concurrent-domains")]
    pub max_concurrent_domains: usize,

    /// Number of search results to crawl
    #[serde(rename = "num-results")]
    pub num_results: usize,

    /// Follow links beyond each result's landing page
    #[serde(rename = "deep-crawl")]
    pub deep_crawl: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 5,
            politeness_delay_ms: 0,
            max_concurrent_domains: 8,
            num_results: 3,
            deep_crawl: true,
        }
    }
}

/// Which [`crate::crawler::PageFetcher`] implementation to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    /// Plain HTTP GET, no JavaScript
    #[default]
    Http,

    /// A real browser driven over WebDriver
    Webdriver,
}

/// Page fetching behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    pub backend: FetcherBackend,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Extra request headers sent with every page fetch
    pub headers: BTreeMap<String, String>,

    /// Upper bound on one page load (seconds)
    #[serde(rename = "page-timeout-secs")]
    pub page_timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Characters of raw HTML kept on each page result
    #[serde(rename = "html-cap")]
    pub html_cap: usize,

    /// Paragraphs kept from a page's main content block
    #[serde(rename = "max-content-paragraphs")]
    pub max_content_paragraphs: usize,

    /// WebDriver server used by the `webdriver` backend
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert(
            "Accept".to_string(),
            "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8".to_string(),
        );
        headers.insert("Accept-Language".to_string(), "en-US,en;q=0.9".to_string());

        Self {
            backend: FetcherBackend::Http,
            user_agent: concat!("fathom/", env!("CARGO_PKG_VERSION")).to_string(),
            headers,
            page_timeout_secs: 30,
            connect_timeout_secs: 10,
            html_cap: 20_000,
            max_content_paragraphs: 50,
            webdriver_url: "http://localhost:4444".to_string(),
        }
    }
}

/// Search backend endpoint and request headers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// HTML search endpoint; the query is sent as `q`
    pub endpoint: String,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    pub referer: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://html.duckduckgo.com/html/".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html".to_string(),
            accept_language: "en-US".to_string(),
            referer: "https://duckduckgo.com/".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Where session results are written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON dump of the whole session
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,

    /// Directory receiving one Markdown file per successful page
    #[serde(rename = "markdown-dir")]
    pub markdown_dir: Option<String>,

    /// SQLite database for notification records
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

/// Signed webhook notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,

    /// Webhook receiving the notification payload
    pub endpoint: String,

    /// HS256 signing secret for the `access-token` header
    pub secret: String,

    /// Recipient placed in the payload's `user` list
    pub recipient: String,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            secret: String::new(),
            recipient: String::new(),
            timeout_secs: 10,
        }
    }
}
