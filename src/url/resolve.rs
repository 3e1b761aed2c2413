use url::Url;

/// Binary and media file extensions that are never crawled
pub const DENIED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".zip", ".rar", ".tar", ".gz",
    ".jpg", ".jpeg", ".png", ".gif", ".mp3", ".mp4", ".avi", ".mov",
];

/// Returns true if the URL path ends in a denylisted file extension
pub fn has_denied_extension(url: &Url) -> bool {
    let path = url.path().to_ascii_lowercase();
    DENIED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// Resolves an href against a base URL and filters non-navigable targets
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only anchors
/// - `javascript:`, `mailto:` and `tel:` schemes
/// - anything that does not resolve to HTTP(S)
/// - paths ending in a binary/media extension (see [`DENIED_EXTENSIONS`])
///
/// The returned URL is absolute with its fragment removed.
///
/// # Examples
///
/// ```
/// use fathom::url::resolve_link;
///
/// assert_eq!(
///     resolve_link("https://a.com/dir/", "../page1"),
///     Some("https://a.com/page1".to_string())
/// );
/// assert_eq!(resolve_link("https://a.com", "report.pdf"), None);
/// assert_eq!(resolve_link("https://a.com", "mailto:x@y.com"), None);
/// ```
pub fn resolve_link(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
    {
        return None;
    }

    let base = Url::parse(base_url).ok()?;
    let mut absolute = base.join(href).ok()?;

    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    if has_denied_extension(&absolute) {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute.to_string())
}
