//! Console summary of a crawl session

use crate::model::CrawlSessionResult;
use crate::output::OutputResult;
use serde_json::json;

/// Characters of page text shown as a preview in single-page mode
const PREVIEW_CHARS: usize = 150;

/// Formats the human-readable summary of a session
///
/// Lists each search hit with a ✓/✗ crawl marker and its domain. In deep
/// mode successful hits show their page count; otherwise they show a preview
/// of the page text. Session analytics follow the list. A failed session
/// prints only its error.
pub fn format_summary(session: &CrawlSessionResult) -> String {
    let mut out = String::new();
    out.push_str("\n--- Search Results Summary ---\n");

    if !session.success {
        out.push_str(&format!(
            "Search failed: {}\n",
            session.error.as_deref().unwrap_or("Unknown error")
        ));
        return out;
    }

    for (i, hit) in session.search_results.iter().enumerate() {
        let crawled = session.domain_results.get(i).filter(|d| d.success);
        let marker = if crawled.is_some() { "✓" } else { "✗" };
        let domain = crate::url::domain(&hit.url).unwrap_or_default();

        out.push_str(&format!("{}. [{}] {} ({})\n", i + 1, marker, hit.title, domain));
        out.push_str(&format!("   URL: {}\n", hit.url));

        if let Some(result) = crawled {
            if session.deep_crawl_enabled {
                out.push_str(&format!("   Pages crawled: {}\n", result.pages.len()));
            } else {
                let text = result
                    .pages
                    .first()
                    .map(|p| p.plain_text.as_str())
                    .unwrap_or_default();
                out.push_str(&format!("   Preview: {}\n", preview(text)));
            }
        }
        out.push('\n');
    }

    let analysis = &session.analysis;
    out.push_str("\n--- Deep Scrape Analysis ---\n");
    out.push_str(&format!(
        "Total domains scraped: {}/{}\n",
        analysis.successful_domains, analysis.total_domains
    ));
    out.push_str(&format!("Total pages crawled: {}\n", analysis.total_pages));
    out.push_str(&format!("Tables found: {}\n", analysis.tables_found));
    out.push_str(&format!(
        "Pages with structured data: {}\n",
        analysis.structured_data_found
    ));

    out
}

/// Prints [`format_summary`] to stdout
pub fn print_summary(session: &CrawlSessionResult) {
    print!("{}", format_summary(session));
}

/// Renders the short JSON view shown when no output file was requested
///
/// Keeps the query, outcome, timestamp, hit titles and URLs, and the
/// analysis; page contents are left out.
pub fn truncated_json(session: &CrawlSessionResult) -> OutputResult<String> {
    let hits: Vec<_> = session
        .search_results
        .iter()
        .map(|r| json!({ "title": r.title, "url": r.url }))
        .collect();

    let summary = json!({
        "query": session.query,
        "success": session.success,
        "timestamp": session.timestamp,
        "search_results": hits,
        "analysis": session.analysis,
    });

    Ok(serde_json::to_string_pretty(&summary)?)
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
