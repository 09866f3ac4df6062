//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind the [`PageFetcher`] trait, with a delay decorator
//! - HTML parsing and absolute link extraction
//! - The depth-bounded concurrent [`CrawlEngine`]
//! - Crawl sessions and the [`ResultController`] that drains them

mod controller;
mod engine;
mod fetcher;
mod parser;
mod result;
mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::{ControllerExit, ControllerReport, ResultController};
pub use engine::{CrawlEngine, ScanTask, SessionStats, DEFAULT_WORKERS};
pub use fetcher::{build_fetcher, build_http_client, DelayFetcher, HttpFetcher, PageFetcher};
pub use parser::{parse_page, Page};
pub use result::CrawlResult;
pub use session::{Session, SessionReport, SessionSettings};
