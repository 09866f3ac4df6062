//! Page fetcher implementations
//!
//! This module handles page retrieval for the crawler, including:
//! - The [`PageFetcher`] trait the engine is written against
//! - An HTTP implementation with a fixed per-request timeout
//! - A delay decorator that pauses before every request
//! - Error classification into [`FetchError`]

use crate::config::FetcherConfig;
use crate::crawler::parser::{parse_page, Page};
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Retrieves a single page and hands its content to the parser
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches and parses the page at `url`
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP
///
/// The status code is not inspected: any response whose body can be read is
/// parsed, so an error page with a `<title>` counts as a successful fetch.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the fetcher configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let target = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(classify_error)?;

        tracing::trace!("GET {} -> {}", url, response.status());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(parse_page(&body)?)
    }
}

/// Classifies a transport error
fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// Waits a fixed duration before delegating to the wrapped fetcher
///
/// Every fetch through this decorator takes at least `delay` longer. It keeps
/// no state of its own.
#[derive(Debug, Clone)]
pub struct DelayFetcher<F> {
    delay: Duration,
    inner: F,
}

impl<F: PageFetcher> DelayFetcher<F> {
    /// Wraps `inner`, pausing `delay` before each fetch
    pub fn new(delay: Duration, inner: F) -> Self {
        Self { delay, inner }
    }

    /// The pause applied before each fetch
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for DelayFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(url).await
    }
}

/// Builds the fetcher described by the configuration
///
/// The HTTP fetcher is wrapped in a [`DelayFetcher`] when a delay is
/// configured.
pub fn build_fetcher(config: &FetcherConfig) -> crate::Result<Arc<dyn PageFetcher>> {
    let http = HttpFetcher::new(config)?;

    Ok(match config.delay() {
        Some(delay) => {
            tracing::debug!("Delaying every request by {:?}", delay);
            Arc::new(DelayFetcher::new(delay, http))
        }
        None => Arc::new(http),
    })
}
