//! Visited-set tracking for a single crawl session
//!
//! The set only ever grows. It is shared by every scan unit of one session and
//! dropped with the session.

use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Decides when a URL enters the visited set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitPolicy {
    /// Insert-if-absent right before the fetch, under a single write lock.
    /// Two units racing on the same URL cannot both fetch it.
    #[default]
    ClaimBeforeFetch,

    /// Mark after the fetch completes, whatever its outcome. Units that pass
    /// the visited check before the first fetch finishes will fetch the same
    /// URL again and emit a duplicate result.
    MarkAfterFetch,
}

impl fmt::Display for VisitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClaimBeforeFetch => write!(f, "claim-before-fetch"),
            Self::MarkAfterFetch => write!(f, "mark-after-fetch"),
        }
    }
}

/// Set of URLs seen by one session, behind a reader/writer lock
///
/// Cloning is cheap and every clone refers to the same set.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    inner: Arc<RwLock<HashSet<String>>>,
}

impl VisitedSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `url` has been marked or claimed
    pub async fn contains(&self, url: &str) -> bool {
        self.inner.read().await.contains(url)
    }

    /// Inserts `url` if absent
    ///
    /// Returns true when this call inserted it, false when it was already
    /// present. The check and the insert happen under one write lock.
    pub async fn claim(&self, url: &str) -> bool {
        let mut visited = self.inner.write().await;
        if visited.contains(url) {
            return false;
        }
        visited.insert(url.to_string())
    }

    /// Marks `url` as visited, whether or not it was already present
    pub async fn mark(&self, url: &str) {
        self.inner.write().await.insert(url.to_string());
    }

    /// Number of distinct URLs in the set
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Returns true if nothing has been visited yet
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
