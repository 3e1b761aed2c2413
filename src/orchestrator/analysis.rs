//! Session analytics
//!
//! Aggregates page, table and structured-data counts across the domains of a
//! session and builds a truncated excerpt of everything that was read.

use crate::model::{Analysis, DomainCrawlResult, DomainInsight};

/// Characters of combined page text kept in the excerpt
pub const EXCERPT_LIMIT: usize = 5000;

/// Computes analytics over a session's domain results
///
/// Domains whose crawl did not succeed count toward `total_domains` only.
/// For the rest, every recorded page (failed ones included) counts toward
/// `total_pages`, and each page's plain text is joined with spaces into the
/// excerpt, which is cut at [`EXCERPT_LIMIT`] characters plus `...`.
///
/// # Example
///
/// ```
/// use fathom::orchestrator::analyze;
///
/// let analysis = analyze(&[]);
/// assert_eq!(analysis.total_domains, 0);
/// assert_eq!(analysis.content_summary, "Total content extracted: 0 characters");
/// ```
pub fn analyze(domain_results: &[DomainCrawlResult]) -> Analysis {
    let mut analysis = Analysis {
        total_domains: domain_results.len(),
        successful_domains: domain_results.iter().filter(|d| d.success).count(),
        ..Default::default()
    };

    let mut all_text: Vec<&str> = Vec::new();

    for domain_result in domain_results.iter().filter(|d| d.success) {
        let mut insight = DomainInsight {
            domain: domain_result.domain.clone(),
            pages_crawled: domain_result.pages.len(),
            tables_found: domain_result.table_count(),
            ..Default::default()
        };
        analysis.total_pages += domain_result.pages.len();

        for page in &domain_result.pages {
            all_text.push(&page.plain_text);

            if page.has_structured_data() {
                insight.has_structured_data = true;
                analysis.structured_data_found += 1;
            }
        }

        analysis.tables_found += insight.tables_found;
        analysis.domain_insights.push(insight);
    }

    let excerpt = truncate_excerpt(&all_text.join(" "));
    analysis.content_summary = format!(
        "Total content extracted: {} characters",
        excerpt.chars().count()
    );
    analysis.content_excerpt = excerpt;

    analysis
}

fn truncate_excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
