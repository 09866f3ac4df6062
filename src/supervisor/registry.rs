//! Registry of running crawl sessions

use crate::crawler::SessionReport;
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::task::{JoinError, JoinSet};

/// What the supervisor knows about a session while it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: u64,
    pub max_depth: u32,
    pub started_at: Instant,
}

impl SessionInfo {
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// A finished session: its id and either its report or the reason its task died
pub type FinishedSession = (u64, Result<SessionReport, JoinError>);

/// Tracks every session task owned by a supervisor
///
/// Each session runs as its own task. The registry keeps the join handles so
/// the supervisor can wait on whichever session finishes first, and a map of
/// the sessions still running.
#[derive(Default)]
pub struct SessionRegistry {
    tasks: JoinSet<FinishedSession>,
    active: HashMap<u64, SessionInfo>,
    started: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for the next session to register
    pub fn next_id(&self) -> u64 {
        self.started + 1
    }

    /// Registers a session task under `id`
    ///
    /// The session runs on its own task, so a panic inside it surfaces from
    /// [`SessionRegistry::join_next`] as an error paired with its id.
    pub fn register<F>(&mut self, id: u64, max_depth: u32, session: F)
    where
        F: Future<Output = SessionReport> + Send + 'static,
    {
        self.started = self.started.max(id);
        self.active.insert(
            id,
            SessionInfo {
                id,
                max_depth,
                started_at: Instant::now(),
            },
        );

        let handle = tokio::spawn(session);
        self.tasks.spawn(async move { (id, handle.await) });
    }

    /// Waits for the next session to finish
    ///
    /// Returns `None` when no session is registered.
    pub async fn join_next(&mut self) -> Option<FinishedSession> {
        loop {
            match self.tasks.join_next().await? {
                Ok((id, outcome)) => {
                    self.active.remove(&id);
                    return Some((id, outcome));
                }
                // The wrapper itself only fails when aborted at shutdown.
                Err(e) => tracing::debug!("Session wrapper ended: {}", e),
            }
        }
    }

    /// Running sessions, oldest first
    pub fn active(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<_> = self.active.values().cloned().collect();
        sessions.sort_by_key(|info| info.id);
        sessions
    }

    /// Number of sessions registered so far
    pub fn started(&self) -> u64 {
        self.started
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
