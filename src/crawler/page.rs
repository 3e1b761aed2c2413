//! Single-page fetch and extraction
//!
//! [`fetch_page`] turns one URL into one [`PageResult`]: it validates the
//! URL, fetches it through a [`PageFetcher`] under a timeout, and runs every
//! extractor over the returned document. Failures never escape as errors;
//! they are recorded on the result.

use crate::crawler::content::{collapse_whitespace, visible_text, ContentExtractor, LargestTextBlock};
use crate::crawler::fetcher::{FetchError, FetchedDocument, PageFetcher};
use crate::crawler::parser::{extract_links_from, extract_title};
use crate::crawler::structured::{extract_structured_from, extract_tables_from};
use crate::config::FetcherConfig;
use crate::model::{PageMetadata, PageResult, StructuredData};
use crate::url::visit_key;
use scraper::{Html, Selector};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-page limits and extraction settings
#[derive(Clone)]
pub struct FetchOptions {
    /// Upper bound on one fetch, including rendering
    pub page_timeout: Duration,

    /// Maximum number of characters of HTML kept on the result
    pub html_cap: usize,

    /// Strategy used to fill [`PageResult::content`]
    pub content_extractor: Arc<dyn ContentExtractor>,
}

impl FetchOptions {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            html_cap: config.html_cap,
            content_extractor: Arc::new(LargestTextBlock::new(config.max_content_paragraphs)),
        }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from_config(&FetcherConfig::default())
    }
}

impl fmt::Debug for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchOptions")
            .field("page_timeout", &self.page_timeout)
            .field("html_cap", &self.html_cap)
            .finish_non_exhaustive()
    }
}

/// Fetches one URL and extracts everything the crawler records about it
///
/// # Arguments
///
/// * `fetcher` - Backend used to retrieve the document
/// * `url` - The URL to fetch; it is validated before any network I/O
/// * `depth` - BFS depth recorded on the result
/// * `options` - Timeout, HTML cap and content strategy
///
/// # Returns
///
/// A [`PageResult`]. On failure `success` is false, `error` and
/// `error_kind` are set, and all text, HTML and link fields are empty.
pub async fn fetch_page(
    fetcher: &dyn PageFetcher,
    url: &str,
    depth: u32,
    options: &FetchOptions,
) -> PageResult {
    let (valid, normalized) = crate::url::validate(url);
    if !valid {
        tracing::warn!("Invalid URL: {}", url);
        let err = FetchError::InvalidUrl(url.to_string());
        return PageResult::failed(url, depth, err.kind(), "Invalid URL format");
    }

    tracing::info!("Scraping: {}", normalized);

    let fetched = tokio::time::timeout(options.page_timeout, fetcher.fetch(&normalized)).await;

    let document = match fetched {
        Ok(Ok(document)) => document,
        Ok(Err(e)) => {
            tracing::warn!("Error scraping {}: {}", normalized, e);
            return PageResult::failed(normalized, depth, e.kind(), e.to_string());
        }
        Err(_) => {
            let err = FetchError::Timeout(format!(
                "Operation timed out after {} seconds",
                options.page_timeout.as_secs()
            ));
            tracing::warn!("Timeout while scraping: {}", normalized);
            return PageResult::failed(normalized, depth, err.kind(), err.to_string());
        }
    };

    let page = build_page(normalized, depth, document, options);
    tracing::debug!(
        "Successfully scraped: {} ({} links, {} tables)",
        page.url,
        page.links.len(),
        page.tables.len()
    );
    page
}

/// Runs every extractor over a fetched document
///
/// Kept synchronous so the parsed DOM never lives across an await point.
pub fn build_page(
    url: String,
    depth: u32,
    fetched: FetchedDocument,
    options: &FetchOptions,
) -> PageResult {
    let document = Html::parse_document(&fetched.html);

    let title = fetched
        .title
        .clone()
        .or_else(|| extract_title(&document))
        .unwrap_or_default();

    let final_url = Some(fetched.final_url.as_str())
        .filter(|f| !f.is_empty() && visit_key(f) != visit_key(&url))
        .map(str::to_string);
    let links = extract_links_from(&document, final_url.as_deref().unwrap_or(&url));

    let structured_data = extract_structured_from(&document);
    let metadata = extract_metadata(&document, &structured_data);
    let tables = extract_tables_from(&document);
    let content = options.content_extractor.extract(&document);
    let markdown = html_to_markdown(&document, &title);

    let plain_text = match fetched.plain_text {
        Some(text) => text,
        None => body_text(&document),
    };

    PageResult {
        url,
        final_url,
        success: true,
        depth,
        title,
        plain_text,
        html_snippet: truncate_chars(&fetched.html, options.html_cap),
        markdown,
        content,
        links,
        metadata,
        structured_data,
        tables,
        error: None,
        error_kind: None,
    }
}

/// Reads description, language and author from the document head
fn extract_metadata(document: &Html, structured: &StructuredData) -> PageMetadata {
    let description = structured
        .meta_tags
        .get("description")
        .or_else(|| structured.open_graph.get("description"))
        .cloned()
        .unwrap_or_default();

    let language = document
        .root_element()
        .value()
        .attr("lang")
        .unwrap_or_default()
        .to_string();

    let author = structured
        .meta_tags
        .get("author")
        .cloned()
        .unwrap_or_default();

    PageMetadata {
        description,
        language,
        author,
    }
}

/// Renders a best-effort Markdown view of the page
///
/// Starts with `# {title}`, then walks headings, paragraphs and unordered
/// list items in document order.
pub fn html_to_markdown(document: &Html, title: &str) -> String {
    let mut markdown = format!("# {}\n\n", title);

    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6, p, ul > li") else {
        return markdown;
    };

    for element in document.select(&selector) {
        let text = collapse_whitespace(&visible_text(&element));
        if text.is_empty() {
            continue;
        }

        match element.value().name() {
            "p" => {
                markdown.push_str(&text);
                markdown.push_str("\n\n");
            }
            "li" => {
                markdown.push_str("* ");
                markdown.push_str(&text);
                markdown.push('\n');
            }
            heading => {
                let level = heading[1..].parse::<usize>().unwrap_or(1);
                markdown.push_str(&"#".repeat(level));
                markdown.push(' ');
                markdown.push_str(&text);
                markdown.push_str("\n\n");
            }
        }
    }

    markdown
}

/// Visible body text, one line per non-blank source line
fn body_text(document: &Html) -> String {
    let root = match Selector::parse("body") {
        Ok(sel) => document.select(&sel).next(),
        Err(_) => None,
    }
    .unwrap_or_else(|| document.root_element());

    visible_text(&root)
        .lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
