//! Crawl sessions
//!
//! A session is one engine run with its own depth ceiling, visited set and
//! result stream. Starting a session spawns the engine driver; the stream is
//! handed to a controller through [`Session::run_with`].

use crate::config::CrawlerConfig;
use crate::crawler::controller::{ControllerExit, ControllerReport, ResultController};
use crate::crawler::engine::{CrawlEngine, ScanTask, SessionStats};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::result::CrawlResult;
use crate::state::VisitPolicy;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Parameters of a single session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub start_url: String,
    pub start_depth: u32,
    pub max_depth: u32,
    pub workers: usize,
    pub result_buffer: usize,
    pub visit_policy: VisitPolicy,
}

impl SessionSettings {
    /// Settings of the first session described by the configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            start_url: config.start_url.clone(),
            start_depth: config.cur_depth,
            max_depth: config.max_depth,
            workers: config.workers,
            result_buffer: config.result_buffer,
            visit_policy: config.visit_policy,
        }
    }

    /// The same settings with a different depth ceiling
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// What a finished session reports to its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub id: u64,
    pub max_depth: u32,
    pub controller: ControllerReport,

    /// Engine counters; `None` when the controller stopped before the engine
    /// finished and the engine was left to wind down on its own
    pub stats: Option<SessionStats>,
}

/// A running crawl session
pub struct Session {
    id: u64,
    max_depth: u32,
    results: mpsc::Receiver<CrawlResult>,
    driver: JoinHandle<SessionStats>,
}

impl Session {
    /// Starts a session: fresh visited set, fresh result stream
    ///
    /// The engine starts fetching right away. Results wait in the stream
    /// (up to `result_buffer` of them) until a controller drains it.
    pub fn start(
        id: u64,
        fetcher: Arc<dyn PageFetcher>,
        settings: &SessionSettings,
        cancel: CancellationToken,
    ) -> Self {
        let (tx, rx) = mpsc::channel(settings.result_buffer.max(1));

        let engine = CrawlEngine::new(fetcher, settings.max_depth, cancel, tx)
            .with_workers(settings.workers)
            .with_visit_policy(settings.visit_policy);
        let seed = ScanTask::new(settings.start_url.clone(), settings.start_depth);
        let driver = tokio::spawn(Arc::new(engine).run(seed));

        Self {
            id,
            max_depth: settings.max_depth,
            results: rx,
            driver,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Drains the session with `controller` and collects the engine counters
    pub async fn run_with(
        self,
        controller: &ResultController,
        cancel: &CancellationToken,
    ) -> SessionReport {
        let Self {
            id,
            max_depth,
            mut results,
            driver,
        } = self;

        let report = controller.run(&mut results, cancel).await;

        // Dropping the stream unblocks any unit waiting to send.
        drop(results);

        // After a timeout or cancellation the engine may still be waiting on
        // fetches in flight; those are not awaited.
        let stats = if report.exit == ControllerExit::Drained || driver.is_finished() {
            match driver.await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::error!("Session {} driver failed: {}", id, e);
                    None
                }
            }
        } else {
            tracing::debug!("Session {} engine left to wind down", id);
            None
        };

        SessionReport {
            id,
            max_depth,
            controller: report,
            stats,
        }
    }
}
