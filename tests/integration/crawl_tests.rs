//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use depth_crawler::config::{resolve_config, ConfigOverrides, CrawlerConfig, FetcherConfig};
use depth_crawler::crawler::{
    build_fetcher, ControllerExit, CrawlEngine, DelayFetcher, HttpFetcher, ScanTask,
};
use depth_crawler::{
    ConfigError, CrawlResult, FetchError, PageFetcher, SessionSupervisor, SupervisorExit,
};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(title: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">link</a>"#, link))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn http_fetcher() -> Arc<dyn PageFetcher> {
    Arc::new(HttpFetcher::new(&FetcherConfig::default()).expect("Failed to build client"))
}

fn crawler_config(start_url: String, max_depth: u32) -> CrawlerConfig {
    CrawlerConfig {
        start_url,
        max_depth,
        workers: 4,
        ..CrawlerConfig::default()
    }
}

/// Returns a URL on a local port with nothing listening
fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

async fn collect(mut rx: mpsc::Receiver<CrawlResult>) -> Vec<CrawlResult> {
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    results
}

#[tokio::test]
async fn test_seed_without_links_yields_one_result() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html("Lonely", &[])).await;

    let config = crawler_config(format!("{}/", server.uri()), 5);
    let mut supervisor = SessionSupervisor::new(config, http_fetcher());
    let (_tx, rx) = mpsc::channel(1);

    let exit = supervisor.run(rx).await;

    assert_eq!(exit, SupervisorExit::Completed);
    let report = &supervisor.reports()[0];
    assert_eq!(report.controller.successes, 1);
    assert_eq!(report.controller.errors, 0);
    assert_eq!(report.stats.expect("Missing stats").fetches, 1);
}

#[tokio::test]
async fn test_relative_links_are_never_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links = vec![
        format!("{}/a", base),
        format!("{}/b", base),
        format!("{}/c", base),
        "/relative".to_string(),
        "sibling.html".to_string(),
    ];
    mount_page(&server, "/", html("Home", &links)).await;
    for page in ["/a", "/b", "/c"] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(html(page, &[format!("{}/deeper", base)])),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let (tx, rx) = mpsc::channel(100);
    let engine = CrawlEngine::new(http_fetcher(), 2, CancellationToken::new(), tx);
    Arc::new(engine)
        .run(ScanTask::new(format!("{}/", base), 0))
        .await;
    let results = collect(rx).await;

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| !r.is_error()));
    assert_eq!(results.iter().filter(|r| r.depth == 1).count(), 3);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .expect("Request recording disabled")
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    assert_eq!(requested.len(), 4);
    assert!(!requested.iter().any(|p| p == "/relative" || p == "/sibling.html"));
    assert!(!requested.iter().any(|p| p == "/deeper"));
}

#[tokio::test]
async fn test_failed_seed_with_one_allowed_error_cancels() {
    let config = CrawlerConfig {
        max_errors: 1,
        ..crawler_config(refused_url(), 3)
    };
    let mut supervisor = SessionSupervisor::new(config, http_fetcher());
    let token = supervisor.cancellation_token();
    let (_tx, rx) = mpsc::channel(1);

    let exit = supervisor.run(rx).await;

    assert_eq!(exit, SupervisorExit::Cancelled);
    assert!(token.is_cancelled());
    let report = &supervisor.reports()[0];
    assert_eq!(report.controller.errors, 1);
    assert!(report.controller.threshold_reached);
    assert_eq!(report.controller.exit, ControllerExit::Cancelled);
}

#[test]
fn test_cur_depth_not_below_max_depth_is_rejected() {
    let overrides = ConfigOverrides {
        cur_depth: Some(2),
        max_depth: Some(2),
        ..ConfigOverrides::default()
    };

    match resolve_config(None, &overrides) {
        Err(ConfigError::Validation(message)) => assert!(message.contains("cur_depth")),
        other => panic!("Expected a validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_global_timeout_ends_crawl_with_fatal_exit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html("Home", &[format!("{}/slow", base)])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Slow", &[]))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = CrawlerConfig {
        timeout: 1,
        ..crawler_config(format!("{}/", base), 3)
    };
    let mut supervisor = SessionSupervisor::new(config, http_fetcher());
    let (_tx, rx) = mpsc::channel(1);

    let started = Instant::now();
    let exit = supervisor.run(rx).await;

    assert_eq!(exit, SupervisorExit::TimedOut { session: 1 });
    assert!(exit.is_fatal());
    assert!(started.elapsed() < Duration::from_secs(5));

    // The seed page was logged before the deadline.
    let report = &supervisor.reports()[0];
    assert_eq!(report.controller.exit, ControllerExit::TimedOut);
    assert_eq!(report.controller.successes, 1);
}

#[tokio::test]
async fn test_http_status_is_not_checked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(html(
            "Not Found",
            &["https://example.com/home".to_string()],
        )))
        .mount(&server)
        .await;

    let page = http_fetcher()
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .expect("Fetch failed");

    assert_eq!(page.title, "Not Found");
    assert_eq!(page.links, vec!["https://example.com/home".to_string()]);
}

#[tokio::test]
async fn test_slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html("Late", &[]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("Failed to build client");
    let fetcher = HttpFetcher::with_client(client);

    let error = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert_eq!(error, FetchError::Timeout);
    assert_eq!(error.to_string(), "request timeout");
}

#[tokio::test]
async fn test_unreachable_host_is_a_connect_error() {
    let error = http_fetcher().fetch(&refused_url()).await.unwrap_err();
    assert!(matches!(error, FetchError::Connect(_)), "got {:?}", error);
}

#[tokio::test]
async fn test_delay_fetcher_over_http() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html("Delayed", &[])).await;

    let fetcher = DelayFetcher::new(Duration::from_millis(200), http_fetcher());
    let started = Instant::now();
    let page = fetcher
        .fetch(&format!("{}/", server.uri()))
        .await
        .expect("Fetch failed");

    assert!(started.elapsed() >= Duration::from_millis(200));
    assert_eq!(page.title, "Delayed");
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let server = MockServer::start().await;
    let base = server.uri();
    for (route, body) in [
        ("/", html("Home", &[format!("{}/next", base)])),
        ("/next", html("Next", &[format!("{}/", base)])),
    ] {
        // Only requests carrying the configured user agent get the real pages.
        Mock::given(method("GET"))
            .and(path(route))
            .and(header("user-agent", "depth-crawler-tests"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
[crawler]
start-url = "{}/"
max-depth = 1
max-errors = 3
timeout = 30

[fetcher]
delay-ms = 10
user-agent = "depth-crawler-tests"
"#,
        base
    )
    .expect("Failed to write config");

    let overrides = ConfigOverrides {
        max_depth: Some(4),
        ..ConfigOverrides::default()
    };
    let (config, hash) = resolve_config(Some(file.path()), &overrides).expect("Invalid config");
    assert_eq!(hash.map(|h| h.len()), Some(64));
    assert_eq!(config.crawler.max_depth, 4);
    assert_eq!(config.crawler.max_errors, 3);

    let fetcher = build_fetcher(&config.fetcher).expect("Failed to build fetcher");
    let mut supervisor = SessionSupervisor::new(config.crawler, fetcher);
    let (_tx, rx) = mpsc::channel(1);

    assert_eq!(supervisor.run(rx).await, SupervisorExit::Completed);
    assert_eq!(supervisor.reports()[0].controller.successes, 2);
}
