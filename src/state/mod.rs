//! State tracking module for Depth-Crawler
//!
//! This module contains the state shared by the units of a crawl session:
//! - Visited-set tracking and the policy deciding when a URL is marked
//! - Error counting against the configured threshold

mod error_threshold;
mod visited;

pub use error_threshold::ErrorThreshold;
pub use visited::{VisitPolicy, VisitedSet};
