use crate::UrlError;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Host labels ending in an alphabetic TLD, optional port, optional path
const SEED_PATTERN: &str = r"^(?:https?://)?(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,}(?::[0-9]{1,5})?(?:/[^/\s]*)*$";

fn seed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(SEED_PATTERN).expect("seed pattern is a valid regex"))
}

/// Validates a seed URL and prefixes `https://` when no scheme is present
///
/// The check is deliberately conservative and fails closed: anything that
/// does not look like `[scheme://]label.label.tld[:port][/path]` is rejected
/// and the input is returned unchanged alongside `false`. Callers must not
/// fetch an invalid URL.
///
/// # Examples
///
/// ```
/// use fathom::url::validate;
///
/// assert_eq!(validate("example.com"), (true, "https://example.com".to_string()));
/// assert_eq!(validate("http://example.com/a"), (true, "http://example.com/a".to_string()));
/// assert!(!validate("not a url").0);
/// ```
pub fn validate(url: &str) -> (bool, String) {
    let trimmed = url.trim();

    if !seed_pattern().is_match(trimmed) {
        return (false, url.to_string());
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        (true, trimmed.to_string())
    } else {
        (true, format!("https://{}", trimmed))
    }
}

/// Validates and parses a seed URL in one step
///
/// # Returns
///
/// * `Ok((String, Url))` - The normalized string form and its parsed URL
/// * `Err(UrlError)` - The input failed validation or could not be parsed
pub fn parse_valid(url: &str) -> Result<(String, Url), UrlError> {
    let (valid, normalized) = validate(url);
    if !valid {
        return Err(UrlError::InvalidFormat(url.to_string()));
    }

    let parsed = Url::parse(&normalized).map_err(|e| UrlError::Parse(e.to_string()))?;
    if parsed.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok((normalized, parsed))
}

/// Returns the canonical key used for visited-set deduplication
///
/// The URL is parsed (which lowercases the host and adds the root path) and
/// its fragment is dropped, so `https://a.com` and `https://a.com/#top` map
/// to the same key. Unparseable input is used verbatim.
pub fn visit_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
