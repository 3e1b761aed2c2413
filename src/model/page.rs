use crate::crawler::FetchErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page-level metadata read from the document head
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// `<meta name="description">`, falling back to `og:description`
    pub description: String,

    /// The `lang` attribute of the root element
    pub language: String,

    /// `<meta name="author">`
    pub author: String,
}

/// Machine-readable data embedded in a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredData {
    /// Parsed `application/ld+json` blocks, in document order
    pub json_ld: Vec<serde_json::Value>,

    /// `name` → `content` pairs from `<meta>` tags
    pub meta_tags: BTreeMap<String, String>,

    /// `og:*` properties keyed by their suffix
    pub open_graph: BTreeMap<String, String>,

    /// `twitter:*` properties keyed by their suffix
    pub twitter_card: BTreeMap<String, String>,
}

impl StructuredData {
    /// Returns true if no structured data of any kind was found
    pub fn is_empty(&self) -> bool {
        self.json_ld.is_empty()
            && self.meta_tags.is_empty()
            && self.open_graph.is_empty()
            && self.twitter_card.is_empty()
    }
}

/// An HTML table flattened to text cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Zero-based position of the table in the document
    pub id: usize,
    pub caption: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The outcome of one fetch attempt
///
/// Failed fetches carry `success = false`, an error message and kind, and
/// empty text, HTML and link fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,

    /// Where the fetch ended up after redirects, when that differs from `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,

    pub success: bool,

    /// BFS depth relative to the domain crawl's seed
    #[serde(default)]
    pub depth: u32,

    pub title: String,
    pub plain_text: String,

    /// Rendered HTML truncated to the configured cap
    pub html_snippet: String,
    pub markdown: String,

    /// Paragraph-level text of the page's main content block
    #[serde(default)]
    pub content: Vec<String>,

    /// Same-domain links in first-seen document order, without duplicates
    pub links: Vec<String>,
    pub metadata: PageMetadata,
    pub structured_data: StructuredData,
    pub tables: Vec<Table>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FetchErrorKind>,
}

impl PageResult {
    /// Creates a failed result for a URL
    pub fn failed(
        url: impl Into<String>,
        depth: u32,
        kind: FetchErrorKind,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            success: false,
            depth,
            error: Some(error.into()),
            error_kind: Some(kind),
            ..Default::default()
        }
    }

    /// Returns true if any structured data field is non-empty
    pub fn has_structured_data(&self) -> bool {
        !self.structured_data.is_empty()
    }
}
