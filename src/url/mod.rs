//! URL handling module for hostcrawl
//!
//! This module provides root URL validation, candidate link resolution,
//! same-host filtering, and the slug normalization used for dedup keys.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_host, same_host};
pub use normalize::site_id;

/// Reasons a resolved candidate link is not eligible for the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The URL has no hierarchical part (`mailto:`, `javascript:`, `data:`)
    NotHierarchical,
    /// The path is empty or just `/`
    RootPath,
    /// The host or port differs from the crawl root
    ForeignHost,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotHierarchical => "not a hierarchical URL",
            Self::RootPath => "root or empty path",
            Self::ForeignHost => "different host",
        }
    }
}

/// Parses and validates the URL a crawl starts from
///
/// The root must be an absolute `http` or `https` URL with a host.
///
/// # Examples
///
/// ```
/// use hostcrawl::url::parse_root_url;
///
/// assert!(parse_root_url("https://example.com/").is_ok());
/// assert!(parse_root_url("example.com").is_err());
/// assert!(parse_root_url("ftp://example.com/").is_err());
/// ```
pub fn parse_root_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Resolves a raw href against the page it was found on
///
/// Relative links inherit scheme, host and path context from `base`. The
/// fragment is dropped so `#anchor` links collapse onto their page.
pub fn resolve_candidate(href: &str, base: &Url) -> UrlResult<Url> {
    let mut url = base
        .join(href.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", href, e)))?;
    url.set_fragment(None);
    Ok(url)
}

/// Decides whether a resolved candidate may be queued for a crawl rooted at `root`
///
/// # Rules
///
/// - Opaque URLs without a hierarchical path are rejected
/// - Empty and `/` paths are rejected (this is also what drops links back
///   to the home page)
/// - The host and effective port must match the root's
pub fn check_candidate(candidate: &Url, root: &Url) -> Result<(), Rejection> {
    if candidate.cannot_be_a_base() {
        return Err(Rejection::NotHierarchical);
    }

    let path = candidate.path();
    if path.is_empty() || path == "/" {
        return Err(Rejection::RootPath);
    }

    if !same_host(root, candidate) {
        return Err(Rejection::ForeignHost);
    }

    Ok(())
}
