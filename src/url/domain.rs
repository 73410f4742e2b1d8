use url::Url;

/// Extracts the host from a URL, lowercased
///
/// Returns `None` for URLs without a host (`mailto:`, `data:` and friends).
///
/// # Examples
///
/// ```
/// use url::Url;
/// use hostcrawl::url::extract_host;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_host(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("mailto:someone@example.com").unwrap();
/// assert_eq!(extract_host(&url), None);
/// ```
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `candidate` lives on the same host and port as `root`
///
/// The port is compared after applying the scheme default, so
/// `http://example.com/` and `http://example.com:80/a` match while
/// `http://example.com:8080/a` does not. Scheme itself is not compared.
pub fn same_host(root: &Url, candidate: &Url) -> bool {
    match (extract_host(root), extract_host(candidate)) {
        (Some(root_host), Some(candidate_host)) => {
            root_host == candidate_host
                && root.port_or_known_default() == candidate.port_or_known_default()
        }
        _ => false,
    }
}
