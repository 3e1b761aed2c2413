//! HTML parsing for links and titles
//!
//! Link extraction rules:
//! - every `<a href="...">` is considered, in document order
//! - hrefs are resolved and filtered by [`crate::url::resolve_link`]
//! - only links on the same domain as the base URL are kept
//! - duplicates are dropped, keeping the first occurrence

use crate::url::{resolve_link, same_domain};
use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts same-domain, crawlable links from an HTML document
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the document was fetched from
///
/// # Returns
///
/// Absolute URLs in first-seen document order, without duplicates
///
/// # Example
///
/// ```
/// use fathom::crawler::extract_links;
///
/// let html = r#"<a href="/a">A</a><a href="https://other.com/">B</a><a href="/a">A</a>"#;
/// let links = extract_links(html, "https://example.com/");
/// assert_eq!(links, vec!["https://example.com/a".to_string()]);
/// ```
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    extract_links_from(&document, base_url)
}

/// Same as [`extract_links`] for an already parsed document
pub fn extract_links_from(document: &Html, base_url: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        let Some(absolute_url) = resolve_link(base_url, href) else {
            continue;
        };

        if !same_domain(base_url, &absolute_url) {
            continue;
        }

        if seen.insert(absolute_url.clone()) {
            links.push(absolute_url);
        }
    }

    links
}

/// Extracts the page title from the `<title>` tag
pub fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/page";

    fn title_of(html: &str) -> Option<String> {
        extract_title(&Html::parse_document(html))
    }

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>Test Page</title></head><body></body></html>"#;
        assert_eq!(title_of(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_extract_title_with_whitespace() {
        let html = r#"<html><head><title>  Test Page  </title></head><body></body></html>"#;
        assert_eq!(title_of(html), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let html = r#"<html><head></head><body></body></html>"#;
        assert_eq!(title_of(html), None);
    }

    #[test]
    fn test_extract_relative_link() {
        let html = r#"<html><body><a href="/other">Link</a></body></html>"#;
        assert_eq!(
            extract_links(html, BASE),
            vec!["https://example.com/other".to_string()]
        );
    }

    #[test]
    fn test_extract_relative_path_link() {
        let html = r#"<html><body><a href="other">Link</a></body></html>"#;
        assert_eq!(
            extract_links(html, BASE),
            vec!["https://example.com/other".to_string()]
        );
    }

    #[test]
    fn test_off_domain_links_dropped() {
        let html = r#"
            <a href="https://other.com/page">Other</a>
            <a href="https://sub.example.com/page">Subdomain</a>
            <a href="https://example.com:8443/page">Other port</a>
        "#;
        assert!(extract_links(html, BASE).is_empty());
    }

    #[test]
    fn test_link_filtering() {
        let html = r##"
            <a href="/page1">1</a>
            <a href="https://other.com/x">2</a>
            <a href="/file.pdf">3</a>
            <a href="mailto:x@y.com">4</a>
            <a href="#top">5</a>
            <a href="/page1">6</a>
        "##;
        assert_eq!(
            extract_links(html, "https://a.com/"),
            vec!["https://a.com/page1".to_string()]
        );
    }

    #[test]
    fn test_skip_special_schemes() {
        let html = r#"
            <a href="javascript:void(0)">js</a>
            <a href="mailto:test@example.com">mail</a>
            <a href="tel:+1234567890">call</a>
        "#;
        assert!(extract_links(html, BASE).is_empty());
    }

    #[test]
    fn test_follow_nofollow_links() {
        let html = r#"<html><body><a href="/page" rel="nofollow">Link</a></body></html>"#;
        assert_eq!(extract_links(html, BASE).len(), 1);
    }

    #[test]
    fn test_document_order_preserved() {
        let html = r#"
            <html>
            <body>
                <a href="/c">C</a>
                <a href="/a">A</a>
                <a href="/b">B</a>
                <a href="/a#again">A again</a>
            </body>
            </html>
        "#;
        assert_eq!(
            extract_links(html, BASE),
            vec![
                "https://example.com/c".to_string(),
                "https://example.com/a".to_string(),
                "https://example.com/b".to_string(),
            ]
        );
    }

    #[test]
    fn test_anchor_without_href_ignored() {
        let html = r#"<a name="x">No href</a><a href="/ok">Ok</a>"#;
        assert_eq!(extract_links(html, BASE).len(), 1);
    }
}
