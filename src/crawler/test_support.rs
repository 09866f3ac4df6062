//! In-memory fetcher for unit tests

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::parser::Page;
use crate::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

enum Response {
    Page(Page),
    Failure(FetchError),
    Hang,
}

/// Serves canned pages and records every fetch
///
/// Unknown URLs fail with a connection error.
#[derive(Default)]
pub struct StaticFetcher {
    responses: HashMap<String, Response>,
    fetched: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: Page) -> Self {
        self.responses.insert(url.to_string(), Response::Page(page));
        self
    }

    pub fn failure(mut self, url: &str, error: FetchError) -> Self {
        self.responses
            .insert(url.to_string(), Response::Failure(error));
        self
    }

    /// The fetch of `url` never completes
    pub fn hang(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Response::Hang);
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetched
            .lock()
            .unwrap()
            .iter()
            .filter(|fetched| fetched.as_str() == url)
            .count()
    }

    pub fn total_fetches(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.fetched.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Response::Page(page)) => Ok(page.clone()),
            Some(Response::Failure(error)) => Err(error.clone()),
            Some(Response::Hang) => std::future::pending().await,
            None => Err(FetchError::Connect(format!("no route to {}", url))),
        }
    }
}

pub fn page_with(title: &str, links: &[&str]) -> Page {
    Page {
        title: title.to_string(),
        links: links.iter().map(|link| link.to_string()).collect(),
    }
}
