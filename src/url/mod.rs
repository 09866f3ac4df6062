//! URL handling module for Depth-Crawler
//!
//! URLs are opaque strings everywhere else in the crate: two URLs are the same
//! page only if their strings match exactly. This module only answers whether a
//! string is an absolute URL worth following.

use ::url::Url;

/// Parses `candidate` as an absolute URL
///
/// A URL is absolute when it has both a scheme and a host. Relative paths,
/// fragment-only references, protocol-relative references (`//host/path`) and
/// hostless schemes such as `mailto:` are rejected.
///
/// # Examples
///
/// ```
/// use depth_crawler::url::parse_absolute;
///
/// assert!(parse_absolute("https://example.com/a").is_some());
/// assert!(parse_absolute("/a").is_none());
/// ```
pub fn parse_absolute(candidate: &str) -> Option<Url> {
    Url::parse(candidate).ok().filter(|url| url.has_host())
}

/// Returns true if `candidate` has both a scheme and a host
pub fn is_absolute_url(candidate: &str) -> bool {
    parse_absolute(candidate).is_some()
}
