//! Depth-Crawler main entry point
//!
//! This is the command-line interface for the depth-bounded crawler.

use anyhow::Context;
use clap::Parser;
use depth_crawler::config::{resolve_config, ConfigOverrides};
use depth_crawler::crawler::build_fetcher;
use depth_crawler::supervisor::signals::forward_os_signals;
use depth_crawler::{SessionSupervisor, SupervisorExit};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Depth-Crawler: a depth-bounded concurrent web crawler
///
/// Crawls pages reachable from a start URL up to a maximum depth and logs the
/// title of every page it finds. SIGINT or SIGTERM stops the crawl; SIGUSR1
/// starts an additional, deeper crawl.
#[derive(Parser, Debug)]
#[command(name = "depth-crawler")]
#[command(version)]
#[command(about = "A depth-bounded concurrent web crawler", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// URL the crawl starts from
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Depth assigned to the start URL
    #[arg(long)]
    cur_depth: Option<u32>,

    /// Exclusive depth ceiling (1-10)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Error results that stop the crawl (1-99)
    #[arg(long)]
    max_errors: Option<u32>,

    /// Time budget for the whole crawl, in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Pages fetched concurrently per session
    #[arg(long)]
    workers: Option<usize>,

    /// Pause before every request, in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            start_url: self.start_url.clone(),
            cur_depth: self.cur_depth,
            max_depth: self.max_depth,
            max_errors: self.max_errors,
            timeout: self.timeout,
            workers: self.workers,
            delay_ms: self.delay_ms,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Invalid configuration")?;
    match (&cli.config, config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("Using default configuration"),
    }

    tracing::info!(
        "Crawling {} from depth {} to {} (max errors: {}, timeout: {}s)",
        config.crawler.start_url,
        config.crawler.cur_depth,
        config.crawler.max_depth,
        config.crawler.max_errors,
        config.crawler.timeout
    );

    let fetcher = build_fetcher(&config.fetcher).context("Failed to build HTTP client")?;

    let (tx, rx) = mpsc::channel(8);
    let _signals = forward_os_signals(tx).context("Failed to install signal handlers")?;

    let mut supervisor = SessionSupervisor::new(config.crawler, fetcher);
    match supervisor.run(rx).await {
        SupervisorExit::Completed => {
            tracing::info!("Crawl completed");
            Ok(())
        }
        SupervisorExit::Cancelled => {
            tracing::info!("Crawl cancelled");
            Ok(())
        }
        SupervisorExit::TimedOut { session } => {
            tracing::error!("Session {} exceeded the crawl timeout", session);
            std::process::exit(1);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("depth_crawler=info,warn"),
            1 => EnvFilter::new("depth_crawler=debug,info"),
            2 => EnvFilter::new("depth_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
