//! Per-page crawl results

use crate::FetchError;
use std::fmt;

/// Outcome of one fetch attempt, sent from the engine to the controller
///
/// Exactly one of title and error is present: the outcome is either the page
/// title or the error that stopped the fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// The URL that was fetched, as it appeared in the link
    pub url: String,

    /// Depth the URL was fetched at
    pub depth: u32,

    /// The page title, or why the fetch failed
    pub outcome: Result<String, FetchError>,
}

impl CrawlResult {
    /// Creates a successful result
    pub fn success(url: impl Into<String>, depth: u32, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            depth,
            outcome: Ok(title.into()),
        }
    }

    /// Creates a failed result
    pub fn failure(url: impl Into<String>, depth: u32, error: FetchError) -> Self {
        Self {
            url: url.into(),
            depth,
            outcome: Err(error),
        }
    }

    /// The page title, if the fetch succeeded
    pub fn title(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    /// The fetch error, if the fetch failed
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    /// Returns true if the fetch failed
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }
}

impl fmt::Display for CrawlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(title) => write!(f, "Link: {}, Title: {}", self.url, title),
            Err(error) => write!(f, "ERROR Link: {}, err: {}", self.url, error),
        }
    }
}
