use crate::crawler::DEFAULT_WORKERS;
use crate::state::VisitPolicy;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Depth-Crawler
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
}

/// Crawl session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Seed URL every session starts from
    pub start_url: String,

    /// Depth assigned to the seed URL
    pub cur_depth: u32,

    /// Exclusive depth ceiling for the first session
    pub max_depth: u32,

    /// Error results tolerated before the crawl is cancelled
    pub max_errors: u32,

    /// Global time budget of a result controller (seconds)
    pub timeout: u64,

    /// Added to `max_depth` for sessions started by a reconfigure signal
    pub depth_increment: u32,

    /// Maximum number of pages scanned concurrently per session
    pub workers: usize,

    /// Capacity of the result stream between engine and controller
    pub result_buffer: usize,

    /// When a URL enters the visited set
    pub visit_policy: VisitPolicy,
}

impl CrawlerConfig {
    /// Global controller timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Depth ceiling for sessions spawned by a reconfigure signal
    pub fn reconfigured_max_depth(&self) -> u32 {
        self.max_depth.saturating_add(self.depth_increment)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.w3.org/Consortium/".to_string(),
            cur_depth: 0,
            max_depth: 1,
            max_errors: 5,
            timeout: 10,
            depth_increment: 2,
            workers: DEFAULT_WORKERS,
            result_buffer: 100,
            visit_policy: VisitPolicy::default(),
        }
    }
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FetcherConfig {
    /// Per-request timeout (seconds)
    pub request_timeout: u64,

    /// Fixed pause before every request (milliseconds); 0 disables it
    pub delay_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl FetcherConfig {
    /// Per-request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Artificial delay, or `None` when requests are not delayed
    pub fn delay(&self) -> Option<Duration> {
        (self.delay_ms > 0).then(|| Duration::from_millis(self.delay_ms))
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout: 60,
            delay_ms: 0,
            user_agent: format!("depth-crawler/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Values supplied on the command line; each one replaces the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub start_url: Option<String>,
    pub cur_depth: Option<u32>,
    pub max_depth: Option<u32>,
    pub max_errors: Option<u32>,
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub delay_ms: Option<u64>,
}

impl ConfigOverrides {
    /// Applies every set override to `config`
    pub fn apply(&self, config: &mut Config) {
        let crawler = &mut config.crawler;
        if let Some(start_url) = &self.start_url {
            crawler.start_url = start_url.clone();
        }
        if let Some(cur_depth) = self.cur_depth {
            crawler.cur_depth = cur_depth;
        }
        if let Some(max_depth) = self.max_depth {
            crawler.max_depth = max_depth;
        }
        if let Some(max_errors) = self.max_errors {
            crawler.max_errors = max_errors;
        }
        if let Some(timeout) = self.timeout {
            crawler.timeout = timeout;
        }
        if let Some(workers) = self.workers {
            crawler.workers = workers;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.fetcher.delay_ms = delay_ms;
        }
    }
}
