//! Configuration module for Depth-Crawler
//!
//! This module handles loading, parsing, and validating the crawl settings.
//! Values come from an optional TOML file and can be replaced on the command line.
//!
//! # Example
//!
//! ```no_run
//! use depth_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ConfigOverrides, CrawlerConfig, FetcherConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, resolve_config};
pub use validation::{validate, MAX_DEPTH_LIMIT, MAX_ERRORS_LIMIT};
