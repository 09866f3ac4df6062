//! Error counting for a single result controller

/// Counts error results against a fixed limit
///
/// The count never decreases. A new controller starts a new counter, so the
/// threshold is effectively per session.
#[derive(Debug, Clone)]
pub struct ErrorThreshold {
    limit: u32,
    count: u32,
    reached: bool,
}

impl ErrorThreshold {
    /// Creates a counter that trips at `limit` errors
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            count: 0,
            reached: false,
        }
    }

    /// Records one error
    ///
    /// Returns true only for the call that makes the count reach the limit.
    /// Later errors keep counting but return false.
    pub fn record(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        if !self.reached && self.count >= self.limit {
            self.reached = true;
            return true;
        }
        false
    }

    /// Errors recorded so far
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The configured limit
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns true once the limit has been reached
    pub fn is_reached(&self) -> bool {
        self.reached
    }
}
