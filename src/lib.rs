//! Depth-Crawler: a depth-bounded concurrent web crawler
//!
//! This crate discovers pages reachable from a seed URL, extracts their titles
//! and absolute outbound links, and streams one result per page to a controller
//! that enforces an error threshold and a global time budget. A supervisor owns
//! the shared cancellation token and can start deeper crawl sessions while the
//! process is running.

pub mod config;
pub mod crawler;
pub mod state;
pub mod supervisor;
pub mod url;

use thiserror::Error;

/// Main error type for Depth-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Signal handling error: {0}")]
    Signal(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Per-page retrieval errors
///
/// These never stop the crawl. The engine turns each one into a
/// [`crawler::CrawlResult`] for the URL that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timeout")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

/// HTML parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Result type alias for Depth-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, Page, PageFetcher, ResultController};
pub use state::{VisitPolicy, VisitedSet};
pub use supervisor::{SessionSupervisor, SupervisorExit, SupervisorSignal};
