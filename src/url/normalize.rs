/// Normalizes a URL string into the identifier used as a dedup ledger key
///
/// # Normalization Steps
///
/// 1. Lowercase the whole string
/// 2. Keep ASCII letters, digits and `_`
/// 3. Collapse every other run of characters into a single `-`
/// 4. Trim leading and trailing `-` and `_`
///
/// The mapping is intentionally lossy: `/a-b` and `/a/b` on the same host
/// share an identifier and are treated as the same site.
///
/// # Compatibility
///
/// This is not a general-purpose slug. Non-ASCII letters are dropped rather
/// than transliterated (`café` becomes `caf`, not `cafe`) and `&` is a plain
/// separator rather than the word `and`. Ledgers written by tools that
/// transliterate or expand symbols use different keys and will not match.
///
/// # Examples
///
/// ```
/// use hostcrawl::url::site_id;
///
/// assert_eq!(site_id("http://Root.com/About/"), "http-root-com-about");
/// assert_eq!(site_id("https://root.com/a?q=1"), "https-root-com-a-q-1");
/// ```
pub fn site_id(url: &str) -> String {
    let mut id = String::with_capacity(url.len());
    let mut pending_separator = false;

    for c in url.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator && !id.is_empty() {
                id.push('-');
            }
            pending_separator = false;
            id.push(c);
        } else {
            pending_separator = true;
        }
    }

    id.trim_matches(|c| c == '-' || c == '_').to_string()
}
