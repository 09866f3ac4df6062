//! Result controller - drains a session's result stream
//!
//! The controller logs every result, counts errors against the threshold and
//! bounds its whole run with a global timeout. It never exits the process: the
//! report says how draining ended and the caller decides what a timeout means.

use crate::config::CrawlerConfig;
use crate::crawler::result::CrawlResult;
use crate::state::ErrorThreshold;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How a controller run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerExit {
    /// The stream closed and no cancellation was requested
    Drained,

    /// Cancellation was observed; buffered results were drained first
    Cancelled,

    /// The global timeout elapsed while results were still expected
    TimedOut,
}

impl ControllerExit {
    /// Returns true if the run should terminate the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Summary of one controller run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerReport {
    pub exit: ControllerExit,
    pub successes: u64,
    pub errors: u32,
    pub threshold_reached: bool,
}

/// Consumes crawl results and enforces the error threshold and time budget
#[derive(Debug, Clone)]
pub struct ResultController {
    max_errors: u32,
    timeout: Duration,
}

impl ResultController {
    /// Creates a controller
    ///
    /// # Arguments
    ///
    /// * `max_errors` - Error results that trigger cancellation
    /// * `timeout` - Budget for the entire run
    pub fn new(max_errors: u32, timeout: Duration) -> Self {
        Self {
            max_errors,
            timeout,
        }
    }

    /// Creates a controller from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.max_errors, config.timeout())
    }

    /// Drains `results` until the stream closes or the timeout elapses
    ///
    /// # Behavior
    ///
    /// - Success: logged as `Link: <url>, Title: <title>`
    /// - Error: logged as `ERROR Link: <url>, err: <error>` and counted; the
    ///   count reaching `max_errors` logs a notice and cancels `cancel`
    /// - Stream closed: [`ControllerExit::Drained`] or
    ///   [`ControllerExit::Cancelled`] depending on the token
    /// - Token cancelled and nothing buffered: [`ControllerExit::Cancelled`]
    ///   without waiting for fetches still in flight
    /// - Timeout: [`ControllerExit::TimedOut`]; unread results stay unread
    ///
    /// The timeout is checked before every receive, so a busy stream cannot
    /// starve it. Buffered results are read before the token is looked at.
    pub async fn run(
        &self,
        results: &mut mpsc::Receiver<CrawlResult>,
        cancel: &CancellationToken,
    ) -> ControllerReport {
        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        let mut threshold = ErrorThreshold::new(self.max_errors);
        let mut successes = 0;

        let exit = loop {
            tokio::select! {
                biased;

                _ = &mut deadline => {
                    tracing::error!("Controller timeout of {:?} elapsed", self.timeout);
                    break ControllerExit::TimedOut;
                }

                received = results.recv() => match received {
                    Some(result) => {
                        if result.is_error() {
                            tracing::warn!("{}", result);
                            if threshold.record() {
                                tracing::warn!("Max errors count is reached - {}", threshold.limit());
                                cancel.cancel();
                            }
                        } else {
                            successes += 1;
                            tracing::info!("{}", result);
                        }
                    }
                    None if cancel.is_cancelled() => break ControllerExit::Cancelled,
                    None => break ControllerExit::Drained,
                },

                _ = cancel.cancelled() => {
                    tracing::debug!("Cancelled with nothing buffered, not waiting for in-flight fetches");
                    break ControllerExit::Cancelled;
                }
            }
        };

        ControllerReport {
            exit,
            successes,
            errors: threshold.count(),
            threshold_reached: threshold.is_reached(),
        }
    }
}
