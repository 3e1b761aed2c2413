//! Page fetching backends
//!
//! This module handles retrieving one page's rendered document, including:
//! - The `PageFetcher` trait every backend implements
//! - Building HTTP clients with the configured user agent and headers
//! - Classifying failures into transport, HTTP status and content errors
//! - A WebDriver backend for JavaScript-heavy sites (`browser` feature)

use crate::config::FetcherConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a fetch failure, recorded on failed pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    InvalidUrl,
    Transport,
    Timeout,
    HttpStatus,
    ContentMismatch,
    Browser,
}

/// Errors that can occur while fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{0}")]
    Timeout(String),

    #[error("HTTP status {status}")]
    HttpStatus { status: u16 },

    #[error("Not an HTML document (content-type: {content_type})")]
    ContentMismatch { content_type: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

impl FetchError {
    /// Returns the classification recorded on a failed [`crate::PageResult`]
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::InvalidUrl(_) => FetchErrorKind::InvalidUrl,
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::Timeout(_) => FetchErrorKind::Timeout,
            Self::HttpStatus { .. } => FetchErrorKind::HttpStatus,
            Self::ContentMismatch { .. } => FetchErrorKind::ContentMismatch,
            Self::Browser(_) => FetchErrorKind::Browser,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(format!("Request timed out: {}", e))
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus {
                status: status.as_u16(),
            }
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// A successfully retrieved document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedDocument {
    /// URL after redirects
    pub final_url: String,

    /// Full document source
    pub html: String,

    /// Title reported by the backend, if it has one
    pub title: Option<String>,

    /// Rendered text reported by the backend; `None` means derive it from the DOM
    pub plain_text: Option<String>,
}

/// A backend that can retrieve a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a single URL
    ///
    /// Implementations must not retry: a failure is terminal for that URL.
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError>;
}

/// Builds an HTTP client with the configured user agent and default headers
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use fathom::config::FetcherConfig;
/// use fathom::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => tracing::warn!("Skipping invalid header {}: {}", name, value),
        }
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.page_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true if a Content-Type header value describes an HTML document
///
/// A missing header is treated as HTML, since many small sites omit it.
pub fn is_html_content_type(content_type: &str) -> bool {
    let content_type = content_type.trim().to_ascii_lowercase();
    content_type.is_empty()
        || content_type.contains("text/html")
        || content_type.contains("application/xhtml+xml")
}

/// Plain HTTP backend
///
/// Does not run JavaScript, so the plain text of a page is derived from the
/// DOM by the caller.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(FetchError::ContentMismatch { content_type });
        }

        let html = response.text().await?;
        tracing::debug!("Fetched {} ({} bytes)", final_url, html.len());

        Ok(FetchedDocument {
            final_url,
            html,
            title: None,
            plain_text: None,
        })
    }
}

#[cfg(feature = "browser")]
pub use self::browser::WebDriverFetcher;

#[cfg(feature = "browser")]
mod browser {
    use super::{FetchError, FetchedDocument, PageFetcher};
    use async_trait::async_trait;
    use fantoccini::{Client, ClientBuilder};
    use std::time::Duration;

    const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);
    const READY_POLL_ATTEMPTS: usize = 40;

    /// Browser backend driving a WebDriver server (chromedriver, geckodriver)
    ///
    /// Every fetch opens its own session and closes it on all exit paths, so
    /// no browser state is shared between pages.
    #[derive(Debug, Clone)]
    pub struct WebDriverFetcher {
        webdriver_url: String,
    }

    impl WebDriverFetcher {
        pub fn new(webdriver_url: impl Into<String>) -> Self {
            Self {
                webdriver_url: webdriver_url.into(),
            }
        }

        async fn render(client: &Client, url: &str) -> Result<FetchedDocument, FetchError> {
            client
                .goto(url)
                .await
                .map_err(|e| FetchError::Browser(format!("navigation failed: {}", e)))?;

            wait_until_ready(client).await?;

            let html = client
                .source()
                .await
                .map_err(|e| FetchError::Browser(format!("could not read source: {}", e)))?;
            let title = client.title().await.ok().filter(|t| !t.trim().is_empty());
            let plain_text = client
                .execute("return document.body ? document.body.innerText : '';", vec![])
                .await
                .ok()
                .and_then(|v| v.as_str().map(str::to_string));
            let final_url = client
                .current_url()
                .await
                .map(|u| u.to_string())
                .unwrap_or_else(|_| url.to_string());

            Ok(FetchedDocument {
                final_url,
                html,
                title,
                plain_text,
            })
        }
    }

    async fn wait_until_ready(client: &Client) -> Result<(), FetchError> {
        for _ in 0..READY_POLL_ATTEMPTS {
            let state = client
                .execute("return document.readyState;", vec![])
                .await
                .map_err(|e| FetchError::Browser(e.to_string()))?;
            if state.as_str() == Some("complete") {
                return Ok(());
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        Err(FetchError::Timeout(
            "document never reached readyState complete".to_string(),
        ))
    }

    #[async_trait]
    impl PageFetcher for WebDriverFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchError> {
            let client = ClientBuilder::native()
                .connect(&self.webdriver_url)
                .await
                .map_err(|e| FetchError::Browser(format!("could not start session: {}", e)))?;

            let result = Self::render(&client, url).await;

            if let Err(e) = client.close().await {
                tracing::warn!("Failed to close WebDriver session: {}", e);
            }

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetcherConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let mut config = FetcherConfig::default();
        config
            .headers
            .insert("bad header".to_string(), "value".to_string());
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(is_html_content_type(""));

        assert!(!is_html_content_type("application/pdf"));
        assert!(!is_html_content_type("image/png"));
        assert!(!is_html_content_type("application/json"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            FetchError::Transport("refused".into()).kind(),
            FetchErrorKind::Transport
        );
        assert_eq!(
            FetchError::Timeout("slow".into()).kind(),
            FetchErrorKind::Timeout
        );
        assert_eq!(
            FetchError::HttpStatus { status: 404 }.kind(),
            FetchErrorKind::HttpStatus
        );
        assert_eq!(
            FetchError::ContentMismatch {
                content_type: "image/png".into()
            }
            .kind(),
            FetchErrorKind::ContentMismatch
        );
    }

    #[test]
    fn test_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FetchErrorKind::ContentMismatch).unwrap();
        assert_eq!(json, "\"content_mismatch\"");
    }

    #[test]
    fn test_error_messages_are_distinct() {
        let timeout =
            FetchError::Timeout("Operation timed out after 30 seconds".into()).to_string();
        let transport = FetchError::Transport("connection refused".into()).to_string();
        assert_ne!(timeout, transport);
        assert!(timeout.contains("timed out"));
        assert!(transport.starts_with("Transport error"));
    }
}
