//! DuckDuckGo HTML search backend
//!
//! Queries the JavaScript-free results page and scrapes it:
//! - each hit is a `.result` block
//! - the title link is `.result__title a`
//! - the snippet is `.result__snippet`
//! - result links are usually redirects carrying the target in `uddg`

use crate::config::SearchConfig;
use crate::model::SearchResult;
use crate::search::{SearchClient, SearchError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Base used to resolve the engine's relative redirect links
const REDIRECT_BASE: &str = "https://duckduckgo.com/";

/// Search client for DuckDuckGo's HTML endpoint
#[derive(Debug, Clone)]
pub struct DuckDuckGoClient {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoClient {
    /// Creates a client with the configured endpoint and header set
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in [
            (ACCEPT, &config.accept),
            (ACCEPT_LANGUAGE, &config.accept_language),
            (REFERER, &config.referer),
        ] {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => tracing::warn!("Skipping invalid {} header: {}", name, value),
            }
        }

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Runs the search and surfaces every failure as a typed error
    pub async fn try_search(
        &self,
        query: &str,
        num_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        parse_results(&body, num_results)
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoClient {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        tracing::info!("Searching DuckDuckGo for: \"{}\"", query);

        match self.try_search(query, num_results).await {
            Ok(results) => {
                tracing::info!("Found {} results", results.len());
                results
            }
            Err(e) => {
                tracing::warn!("DuckDuckGo search failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Parses a results page into at most `num_results` hits
///
/// Only the first `num_results` `.result` blocks are considered; blocks
/// missing a title link or a snippet are skipped, so fewer hits may be
/// returned.
pub fn parse_results(html: &str, num_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let selector = |css: &str| Selector::parse(css).map_err(|e| SearchError::Parse(e.to_string()));
    let result_sel = selector(".result")?;
    let title_sel = selector(".result__title a")?;
    let snippet_sel = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for block in document.select(&result_sel).take(num_results) {
        let (Some(title), Some(snippet)) = (
            block.select(&title_sel).next(),
            block.select(&snippet_sel).next(),
        ) else {
            continue;
        };

        let href = title.value().attr("href").unwrap_or_default();
        results.push(SearchResult {
            title: title.text().collect::<String>().trim().to_string(),
            snippet: snippet.text().collect::<String>().trim().to_string(),
            url: extract_result_url(href),
        });
    }

    Ok(results)
}

/// Decodes the destination of a result link
///
/// Links through the engine's redirector (`/l/?uddg=...`,
/// `//duckduckgo.com/l/?uddg=...` or the same with a scheme) carry the real
/// URL percent-encoded in `uddg`. Anything else is returned as is.
///
/// # Example
///
/// ```
/// use fathom::search::extract_result_url;
///
/// assert_eq!(
///     extract_result_url("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa&rut=x"),
///     "https://example.com/a"
/// );
/// assert_eq!(extract_result_url("https://example.com/"), "https://example.com/");
/// ```
pub fn extract_result_url(href: &str) -> String {
    let Ok(base) = Url::parse(REDIRECT_BASE) else {
        return href.to_string();
    };
    let Ok(link) = base.join(href) else {
        return href.to_string();
    };

    let on_engine = match (link.host_str(), base.host_str()) {
        (Some(host), Some(engine)) => {
            host == engine || host.strip_suffix(engine).is_some_and(|sub| sub.ends_with('.'))
        }
        _ => false,
    };
    if !on_engine {
        return href.to_string();
    }

    link.query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| href.to_string())
}
