//! Session supervisor
//!
//! The supervisor owns the cancellation token shared by every session and a
//! registry of the sessions it started. It reacts to three kinds of events:
//! - Signals from the outside world (shutdown, reconfigure)
//! - Cancellation requested by a controller that hit its error threshold
//! - Sessions finishing, successfully or not
//!
//! It never exits the process. [`SessionSupervisor::run`] returns a
//! [`SupervisorExit`] and the binary maps that to an exit status.

mod registry;
pub mod signals;

pub use registry::{FinishedSession, SessionInfo, SessionRegistry};

use crate::config::CrawlerConfig;
use crate::crawler::{PageFetcher, ResultController, Session, SessionReport, SessionSettings};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Requests delivered to a running supervisor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorSignal {
    /// Cancel every session and exit once they drain
    Shutdown,

    /// Start an additional, deeper session
    Reconfigure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Running,
    Cancelled,
}

/// How a supervisor run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// Every session drained without cancellation
    Completed,

    /// Cancelled by a signal or an error threshold; sessions drained
    Cancelled,

    /// A session's controller ran out of time
    TimedOut { session: u64 },
}

impl SupervisorExit {
    /// Returns true if the process should exit with a failure status
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

enum Event {
    Cancelled,
    Signal(Option<SupervisorSignal>),
    Finished(Option<FinishedSession>),
}

/// Starts crawl sessions and coordinates their shutdown
pub struct SessionSupervisor {
    config: CrawlerConfig,
    fetcher: Arc<dyn PageFetcher>,
    cancel: CancellationToken,
    registry: SessionRegistry,
    state: SupervisorState,
    reports: Vec<SessionReport>,
}

impl SessionSupervisor {
    /// Creates a supervisor with a fresh cancellation token and no sessions
    pub fn new(config: CrawlerConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            config,
            fetcher,
            cancel: CancellationToken::new(),
            registry: SessionRegistry::new(),
            state: SupervisorState::Running,
            reports: Vec::new(),
        }
    }

    /// The token shared by every session
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Sessions that are still running
    pub fn active_sessions(&self) -> Vec<SessionInfo> {
        self.registry.active()
    }

    /// Reports of the sessions that finished, in completion order
    pub fn reports(&self) -> &[SessionReport] {
        &self.reports
    }

    /// Starts the first session at the configured depths
    pub fn start(&mut self) -> u64 {
        self.spawn_session(self.config.max_depth)
    }

    /// Starts a session with its own visited set and controller
    ///
    /// The session shares the fetcher and the cancellation token with every
    /// other session of this supervisor.
    pub fn spawn_session(&mut self, max_depth: u32) -> u64 {
        let id = self.registry.next_id();
        let settings = SessionSettings::from_config(&self.config).with_max_depth(max_depth);
        let controller = ResultController::from_config(&self.config);
        let cancel = self.cancel.clone();

        tracing::info!(
            "Starting session {} at {} (depth {}..{})",
            id,
            settings.start_url,
            settings.start_depth,
            max_depth
        );

        let session = Session::start(id, Arc::clone(&self.fetcher), &settings, cancel.clone());
        self.registry.register(id, max_depth, async move {
            session.run_with(&controller, &cancel).await
        });

        id
    }

    /// Runs until every session has finished
    ///
    /// Starts the first session unless [`SessionSupervisor::start`] was
    /// already called. A closed signal channel is not an error; the
    /// supervisor keeps running without it.
    ///
    /// # Shutdown
    ///
    /// On cancellation the supervisor stops accepting signals and waits for
    /// the registered sessions to drain. Only a session that times out before
    /// cancellation makes the exit [`SupervisorExit::TimedOut`]; once cancelled
    /// the exit stays [`SupervisorExit::Cancelled`].
    pub async fn run(&mut self, mut signals: mpsc::Receiver<SupervisorSignal>) -> SupervisorExit {
        if self.registry.started() == 0 {
            self.start();
        }

        let mut signals_open = true;

        loop {
            let event = tokio::select! {
                biased;

                _ = self.cancel.cancelled() => Event::Cancelled,
                signal = signals.recv(), if signals_open => Event::Signal(signal),
                finished = self.registry.join_next() => Event::Finished(finished),
            };

            match event {
                Event::Cancelled => {
                    tracing::info!("Cancellation requested, draining sessions");
                    break;
                }
                Event::Signal(Some(SupervisorSignal::Shutdown)) => {
                    tracing::info!("Shutdown requested, cancelling sessions");
                    self.cancel.cancel();
                    break;
                }
                Event::Signal(Some(SupervisorSignal::Reconfigure)) => {
                    let max_depth = self.config.reconfigured_max_depth();
                    tracing::info!(
                        "Max depth was increased by {}",
                        self.config.depth_increment
                    );
                    self.spawn_session(max_depth);
                }
                Event::Signal(None) => {
                    tracing::debug!("Signal channel closed");
                    signals_open = false;
                }
                Event::Finished(Some((id, joined))) => {
                    if self.record(id, joined) {
                        self.cancel.cancel();
                        self.state = SupervisorState::Cancelled;
                        return SupervisorExit::TimedOut { session: id };
                    }
                }
                Event::Finished(None) => {
                    tracing::info!("All sessions finished");
                    return SupervisorExit::Completed;
                }
            }
        }

        self.drain().await
    }

    /// Waits for every registered session after cancellation
    async fn drain(&mut self) -> SupervisorExit {
        self.state = SupervisorState::Cancelled;

        for info in self.registry.active() {
            tracing::debug!(
                "Waiting for session {} (running for {:?})",
                info.id,
                info.elapsed()
            );
        }

        while let Some((id, joined)) = self.registry.join_next().await {
            if self.record(id, joined) {
                tracing::warn!("Session {} timed out after cancellation", id);
            }
        }

        SupervisorExit::Cancelled
    }

    /// Logs a finished session; returns true if it timed out
    fn record(&mut self, id: u64, joined: Result<SessionReport, tokio::task::JoinError>) -> bool {
        let report = match joined {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Session {} failed: {}", id, e);
                return false;
            }
        };

        tracing::info!(
            "Session {} (max depth {}) finished: {:?}, {} pages, {} errors",
            report.id,
            report.max_depth,
            report.controller.exit,
            report.controller.successes,
            report.controller.errors
        );
        if let Some(stats) = report.stats {
            tracing::debug!(
                "Session {}: {} scan units, {} fetches, {} URLs visited",
                report.id,
                stats.units,
                stats.fetches,
                stats.visited
            );
        }

        let fatal = report.controller.exit.is_fatal();
        self.reports.push(report);
        fatal
    }
}
