//! Structured data and table extraction
//!
//! Pulls machine-readable data out of a document:
//! - JSON-LD blocks (`<script type="application/ld+json">`)
//! - `<meta name=... content=...>` tags
//! - Open Graph (`og:*`) and Twitter card (`twitter:*`) properties
//! - HTML tables flattened to header and row text

use crate::model::{StructuredData, Table};
use scraper::{ElementRef, Html, Selector};

/// Extracts JSON-LD, meta tags, Open Graph and Twitter card data
///
/// Malformed JSON-LD blocks are skipped. A `<meta>` with a non-empty `name`
/// and `content` always lands in `meta_tags`; only tags without a `name` are
/// checked for an `og:`/`twitter:` `property`. Empty names and contents are
/// ignored, and the first tag for a key wins.
///
/// # Example
///
/// ```
/// use fathom::crawler::extract_structured;
///
/// let html = r#"<head>
///     <meta property="og:title" content="Hello">
///     <script type="application/ld+json">{"@type": "Article"}</script>
/// </head>"#;
/// let data = extract_structured(html);
/// assert_eq!(data.open_graph.get("title").map(String::as_str), Some("Hello"));
/// assert_eq!(data.json_ld.len(), 1);
/// ```
pub fn extract_structured(html: &str) -> StructuredData {
    let document = Html::parse_document(html);
    extract_structured_from(&document)
}

/// Same as [`extract_structured`] for an already parsed document
pub fn extract_structured_from(document: &Html) -> StructuredData {
    let mut data = StructuredData::default();

    if let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) {
        for script in document.select(&selector) {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<serde_json::Value>(raw.trim()) {
                Ok(value) => data.json_ld.push(value),
                Err(e) => tracing::debug!("Skipping malformed JSON-LD block: {}", e),
            }
        }
    }

    if let Ok(selector) = Selector::parse("meta") {
        for meta in document.select(&selector) {
            let attrs = meta.value();
            let non_empty = |attr: &str| attrs.attr(attr).filter(|v| !v.is_empty());
            let Some(content) = non_empty("content") else {
                continue;
            };

            let (map, key) = if let Some(name) = non_empty("name") {
                (&mut data.meta_tags, name)
            } else if let Some(property) = non_empty("property") {
                if let Some(key) = property.strip_prefix("og:") {
                    (&mut data.open_graph, key)
                } else if let Some(key) = property.strip_prefix("twitter:") {
                    (&mut data.twitter_card, key)
                } else {
                    continue;
                }
            } else {
                continue;
            };

            map.entry(key.to_string())
                .or_insert_with(|| content.to_string());
        }
    }

    data
}

/// Extracts every `<table>` in document order
///
/// The first `<tr>` supplies the headers. When that row has no cells the
/// table is treated as headerless and every row is a data row.
pub fn extract_tables(html: &str) -> Vec<Table> {
    let document = Html::parse_document(html);
    extract_tables_from(&document)
}

/// Same as [`extract_tables`] for an already parsed document
pub fn extract_tables_from(document: &Html) -> Vec<Table> {
    let (Ok(table_sel), Ok(caption_sel), Ok(row_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("caption"),
        Selector::parse("tr"),
        Selector::parse("th, td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .enumerate()
        .map(|(id, table)| {
            let caption = table
                .select(&caption_sel)
                .next()
                .map(|c| cell_text(&c))
                .unwrap_or_default();

            let mut rows: Vec<Vec<String>> = table
                .select(&row_sel)
                .map(|row| row.select(&cell_sel).map(|c| cell_text(&c)).collect())
                .collect();

            let headers = match rows.first() {
                Some(first) if !first.is_empty() => rows.remove(0),
                _ => Vec::new(),
            };

            Table {
                id,
                caption,
                headers,
                rows,
            }
        })
        .collect()
}

fn cell_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
