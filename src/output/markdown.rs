//! Per-page Markdown dumps
//!
//! Every successful page that produced Markdown gets its own file, named
//! `dNN_pNN-<title>.md` after its domain and page position in the session.

use crate::model::{CrawlSessionResult, PageResult, Table};
use crate::output::OutputResult;
use regex::Regex;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

/// Characters of the cleaned title kept in a file name
const TITLE_CHARS: usize = 30;

fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\w\s-]").expect("strip pattern is a valid regex"))
}

fn dash_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[-\s]+").expect("dash pattern is a valid regex"))
}

/// Reduces a page title to something safe for a file name
///
/// Drops everything but word characters, whitespace and dashes, then
/// collapses runs of whitespace and dashes into a single dash.
///
/// # Example
///
/// ```
/// use fathom::output::safe_title;
///
/// assert_eq!(safe_title("Rust: The Book!  (2nd ed.)"), "Rust-The-Book-2nd-ed");
/// ```
pub fn safe_title(title: &str) -> String {
    let stripped = strip_pattern().replace_all(title, "");
    dash_pattern()
        .replace_all(&stripped, "-")
        .trim_matches('-')
        .to_string()
}

/// Builds the file name for a page
///
/// `domain_index` and `page_index` are zero-based; the name uses them
/// one-based. An empty title falls back to `result_<d>_<p>`.
pub fn markdown_filename(domain_index: usize, page_index: usize, title: &str) -> String {
    let (d, p) = (domain_index + 1, page_index + 1);
    let title = if title.is_empty() {
        format!("result_{}_{}", d, p)
    } else {
        title.to_string()
    };
    let cleaned: String = safe_title(&title).chars().take(TITLE_CHARS).collect();

    format!("d{:02}_p{:02}-{}.md", d, p, cleaned)
}

/// Renders one page as a standalone Markdown document
///
/// The document starts with the title, URL and description, lists any tables
/// found on the page, and ends with the page's own Markdown after a rule.
pub fn render_page_markdown(page: &PageResult) -> String {
    let mut md = String::new();

    let title = if page.title.is_empty() {
        "Untitled"
    } else {
        &page.title
    };
    md.push_str(&format!("# {}\n\n", title));
    md.push_str(&format!("URL: {}\n\n", page.url));
    md.push_str(&format!("Description: {}\n\n", page.metadata.description));

    if !page.tables.is_empty() {
        md.push_str(&format!("## Tables Found ({})\n\n", page.tables.len()));
        for table in &page.tables {
            push_table(&mut md, table);
        }
    }

    md.push_str("---\n\n");
    md.push_str(&page.markdown);
    md
}

fn push_table(md: &mut String, table: &Table) {
    if table.caption.is_empty() {
        md.push_str(&format!("### Table {}\n\n", table.id + 1));
    } else {
        md.push_str(&format!("### {}\n\n", table.caption));
    }

    if !table.headers.is_empty() {
        md.push_str(&format!("| {} |\n", table.headers.join(" | ")));
        md.push_str(&format!(
            "| {} |\n",
            vec!["---"; table.headers.len()].join(" | ")
        ));
    }

    for row in &table.rows {
        md.push_str(&format!("| {} |\n", row.join(" | ")));
    }

    md.push('\n');
}

/// Writes one Markdown file per successful page of a session
///
/// Creates `dir` if needed. Domains whose crawl failed are skipped, as are
/// failed pages and pages with no Markdown.
///
/// # Returns
///
/// * `Ok(usize)` - Number of files written
/// * `Err(OutputError)` - The directory or a file could not be written
pub fn write_markdown_dir(dir: &Path, session: &CrawlSessionResult) -> OutputResult<usize> {
    fs::create_dir_all(dir)?;

    let mut written = 0;
    for (domain_index, domain_result) in session.domain_results.iter().enumerate() {
        if !domain_result.success {
            continue;
        }

        for (page_index, page) in domain_result.pages.iter().enumerate() {
            if !page.success || page.markdown.is_empty() {
                continue;
            }

            let path = dir.join(markdown_filename(domain_index, page_index, &page.title));
            let mut file = File::create(&path)?;
            file.write_all(render_page_markdown(page).as_bytes())?;
            written += 1;
        }
    }

    tracing::debug!("Wrote {} markdown files to {}", written, dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Analysis, DomainCrawlResult, PageMetadata};
    use chrono::Utc;
    use tempfile::TempDir;

    fn page(title: &str, markdown: &str) -> PageResult {
        PageResult {
            url: "https://example.com/".into(),
            success: true,
            title: title.into(),
            markdown: markdown.into(),
            metadata: PageMetadata {
                description: "A page".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn session(domain_results: Vec<DomainCrawlResult>) -> CrawlSessionResult {
        CrawlSessionResult {
            query: "q".into(),
            success: true,
            error: None,
            timestamp: Utc::now(),
            deep_crawl_enabled: true,
            search_results: Vec::new(),
            domain_results,
            analysis: Analysis::default(),
        }
    }

    #[test]
    fn test_safe_title() {
        assert_eq!(safe_title("Hello, World!"), "Hello-World");
        assert_eq!(safe_title("  --a -- b--  "), "a-b");
        assert_eq!(safe_title("under_score"), "under_score");
        assert_eq!(safe_title("Café Crème"), "Café-Crème");
        assert_eq!(safe_title("!!!"), "");
    }

    #[test]
    fn test_markdown_filename() {
        assert_eq!(
            markdown_filename(0, 2, "Rust Programming Language"),
            "d01_p03-Rust-Programming-Language.md"
        );
        assert_eq!(markdown_filename(9, 0, ""), "d10_p01-result_10_1.md");

        let long = markdown_filename(0, 0, &"word ".repeat(20));
        assert_eq!(long, format!("d01_p01-{}.md", &"word-".repeat(6)[..30]));
    }

    #[test]
    fn test_render_page_without_tables() {
        let md = render_page_markdown(&page("Example", "Body text"));
        assert_eq!(
            md,
            "# Example\n\nURL: https://example.com/\n\nDescription: A page\n\n---\n\nBody text"
        );
    }

    #[test]
    fn test_render_page_with_tables() {
        let mut p = page("", "Body");
        p.tables = vec![
            Table {
                id: 0,
                caption: "Prices".into(),
                headers: vec!["Item".into(), "Cost".into()],
                rows: vec![vec!["Tea".into(), "2".into()]],
            },
            Table {
                id: 1,
                caption: String::new(),
                headers: Vec::new(),
                rows: vec![vec!["x".into()]],
            },
        ];

        let md = render_page_markdown(&p);
        assert!(md.starts_with("# Untitled\n\n"));
        assert!(md.contains(
            "## Tables Found (2)\n\n### Prices\n\n| Item | Cost |\n| --- | --- |\n| Tea | 2 |\n\n"
        ));
        assert!(md.contains("### Table 2\n\n| x |\n\n---\n\nBody"));
    }

    #[test]
    fn test_write_markdown_dir_skips_failures() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("md");

        let mut failed_page = page("Broken", "never written");
        failed_page.success = false;

        let ok = DomainCrawlResult {
            start_url: "https://example.com/".into(),
            domain: "example.com".into(),
            success: true,
            pages: vec![page("First Page", "one"), failed_page, page("Empty", "")],
            error: None,
        };
        let mut failed_domain = DomainCrawlResult::failed("https://other.com/", "boom");
        failed_domain.pages.push(page("Hidden", "two"));
        let second = DomainCrawlResult {
            pages: vec![page("Second", "three")],
            ..ok.clone()
        };

        let written =
            write_markdown_dir(&out, &session(vec![ok, failed_domain, second])).unwrap();
        assert_eq!(written, 2);

        let mut names: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["d01_p01-First-Page.md", "d03_p01-Second.md"]);

        let content = fs::read_to_string(out.join("d01_p01-First-Page.md")).unwrap();
        assert!(content.ends_with("---\n\none"));
    }
}
