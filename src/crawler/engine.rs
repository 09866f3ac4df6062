//! Crawl engine - depth-bounded concurrent traversal
//!
//! The engine explores pages from a seed URL. Each scan of a URL returns the
//! follow-up work instead of spawning it, and [`CrawlEngine::run`] feeds that
//! work through a bounded pool of concurrent scan units:
//! - A FIFO work queue of [`ScanTask`]s
//! - At most `workers` scans in flight, held in a `JoinSet`
//! - Termination when the queue is empty and nothing is in flight
//!
//! Results go to a bounded channel. When the controller falls behind, scan
//! units block on send, which is the only backpressure in a session.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::result::CrawlResult;
use crate::state::{VisitPolicy, VisitedSet};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Default number of concurrent scan units per session
pub const DEFAULT_WORKERS: usize = 32;

/// A URL waiting to be scanned at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    pub url: String,
    pub depth: u32,
}

impl ScanTask {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Counters reported when a session's traversal ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Scan units that ran, including ones that returned without fetching
    pub units: u64,

    /// Fetch attempts made
    pub fetches: u64,

    /// Distinct URLs in the visited set at the end
    pub visited: usize,
}

/// Depth-bounded, deduplicated crawler for one session
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    visited: VisitedSet,
    policy: VisitPolicy,
    max_depth: u32,
    workers: usize,
    cancel: CancellationToken,
    results: mpsc::Sender<CrawlResult>,
    fetches: AtomicU64,
}

impl CrawlEngine {
    /// Creates an engine with a fresh visited set
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Retrieves and parses pages
    /// * `max_depth` - Exclusive depth ceiling: nothing at this depth is fetched
    /// * `cancel` - Checked before every fetch
    /// * `results` - Receives one result per fetch attempt
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        max_depth: u32,
        cancel: CancellationToken,
        results: mpsc::Sender<CrawlResult>,
    ) -> Self {
        Self {
            fetcher,
            visited: VisitedSet::new(),
            policy: VisitPolicy::default(),
            max_depth,
            workers: DEFAULT_WORKERS,
            cancel,
            results,
            fetches: AtomicU64::new(0),
        }
    }

    /// Sets the number of concurrent scan units
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets when URLs enter the visited set
    pub fn with_visit_policy(mut self, policy: VisitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The session's visited set
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    /// Scans one URL and returns the links to explore next
    ///
    /// # Scan Flow
    ///
    /// 1. Already visited → return, nothing emitted
    /// 2. `depth >= max_depth` → return without fetching
    /// 3. Cancelled → return without fetching
    /// 4. Fetch, marking the URL visited according to the [`VisitPolicy`]
    /// 5. Failure → emit the error, no follow-ups
    /// 6. Success → emit the title, return every link at `depth + 1`
    pub async fn scan(&self, url: &str, depth: u32) -> Vec<ScanTask> {
        if self.visited.contains(url).await {
            tracing::trace!("Already visited: {}", url);
            return Vec::new();
        }

        if depth >= self.max_depth {
            tracing::trace!("Depth {} reached for {}", depth, url);
            return Vec::new();
        }

        if self.cancel.is_cancelled() {
            tracing::trace!("Cancelled before fetching {}", url);
            return Vec::new();
        }

        if self.policy == VisitPolicy::ClaimBeforeFetch && !self.visited.claim(url).await {
            tracing::trace!("Lost claim on {}", url);
            return Vec::new();
        }

        tracing::debug!("Fetching {} at depth {}", url, depth);
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let fetched = self.fetcher.fetch(url).await;

        if self.policy == VisitPolicy::MarkAfterFetch {
            self.visited.mark(url).await;
        }

        match fetched {
            Ok(page) => {
                self.emit(CrawlResult::success(url, depth, page.title)).await;
                page.links
                    .into_iter()
                    .map(|link| ScanTask::new(link, depth + 1))
                    .collect()
            }
            Err(error) => {
                self.emit(CrawlResult::failure(url, depth, error)).await;
                Vec::new()
            }
        }
    }

    /// Sends a result, waiting while the stream is full
    async fn emit(&self, result: CrawlResult) {
        if let Err(mpsc::error::SendError(result)) = self.results.send(result).await {
            tracing::debug!("Result stream closed, dropping result for {}", result.url);
        }
    }

    /// Runs the traversal from `seed` until no work is left
    ///
    /// Consumes the engine; the result stream closes when this returns. After
    /// cancellation the queued work is discarded and only in-flight scans are
    /// waited for.
    pub async fn run(self: Arc<Self>, seed: ScanTask) -> SessionStats {
        let mut queue = VecDeque::from([seed]);
        let mut running = JoinSet::new();
        let mut units = 0;

        loop {
            if self.cancel.is_cancelled() && !queue.is_empty() {
                tracing::debug!("Cancelled, discarding {} queued URLs", queue.len());
                queue.clear();
            }

            while running.len() < self.workers {
                let Some(task) = queue.pop_front() else {
                    break;
                };
                let engine = Arc::clone(&self);
                running.spawn(async move { engine.scan(&task.url, task.depth).await });
            }

            match running.join_next().await {
                Some(Ok(next)) => {
                    units += 1;
                    queue.extend(next);
                }
                Some(Err(e)) => {
                    units += 1;
                    tracing::error!("Scan unit failed: {}", e);
                }
                None => break,
            }
        }

        SessionStats {
            units,
            fetches: self.fetches.load(Ordering::Relaxed),
            visited: self.visited.len().await,
        }
    }
}
