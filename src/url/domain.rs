use url::Url;

/// Extracts the network authority (`host[:port]`) from a URL string
///
/// The host is lowercased by the parser. Default ports are omitted, so
/// `https://a.com:443/` and `https://a.com/` share an authority.
///
/// # Examples
///
/// ```
/// use fathom::url::domain;
///
/// assert_eq!(domain("https://example.com/path"), Some("example.com".to_string()));
/// assert_eq!(domain("https://EXAMPLE.COM:8080/"), Some("example.com:8080".to_string()));
/// assert_eq!(domain("not a url"), None);
/// ```
pub fn domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}

/// Returns true when both URLs have the same network authority
///
/// URLs whose authority cannot be determined never match anything.
pub fn same_domain(a: &str, b: &str) -> bool {
    match (domain(a), domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
