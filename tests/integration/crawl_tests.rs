//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end, checking the error log written to disk.

use reachcheck::config::{load_config, Config};
use reachcheck::crawler::{crawl, Coordinator, HttpFetcher};
use reachcheck::output::FileSink;
use reachcheck::ReachError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server's host
fn create_test_config(seed: &str, log_path: &Path) -> Config {
    let mut config = Config::from_seed(seed).expect("Failed to build config");
    config.crawl.progress = false;
    config.crawl.timeout_seconds = 5;
    config.output.log_path = log_path.display().to_string();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// Returns the error lines of a log file, skipping session headers
fn error_lines(log_path: &Path) -> Vec<String> {
    std::fs::read_to_string(log_path)
        .expect("Failed to read log")
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_crawl_follows_links_and_skips_mailto() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<html><body>
            <a href="{}/news">News</a>
            <a href="mailto:x@sohu.com">Mail</a>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(html(r#"<a href="/">Home</a>"#.to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.stats.discovered, 2);
    assert_eq!(report.stats.checked, 2);
    assert_eq!(report.stats.errored, 0);
    assert!(error_lines(&log_path).is_empty());

    let content = std::fs::read_to_string(&log_path).unwrap();
    assert!(content.starts_with("# URL - ERROR - TIME (session started "));
}

#[tokio::test]
async fn test_broken_link_recorded_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Two pages link to the same missing URL
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/broken">b</a><a href="/other">o</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/other"))
        .respond_with(html(r#"<a href="/broken">again</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.errored, 1);

    let lines = error_lines(&log_path);
    assert_eq!(lines.len(), 1);

    let parts: Vec<&str> = lines[0].split(" - ").collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], format!("{}/broken", base_url));
    assert_eq!(parts[1], "404 Not Found");
    assert!(chrono::NaiveDateTime::parse_from_str(parts[2], "%Y-%m-%d %H:%M:%S").is_ok());
}

#[tokio::test]
async fn test_timeout_recorded_and_crawl_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/broken">slow</a><a href="/fine">fine</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(html(String::new()).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/fine"))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let mut config = create_test_config(&format!("{}/", base_url), &log_path);
    config.crawl.timeout_seconds = 1;

    let report = crawl(config).await.expect("Crawl failed");

    assert_eq!(report.stats.checked, 3);
    assert_eq!(report.stats.errored, 1);

    let lines = error_lines(&log_path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&format!("{}/broken - timeout - ", base_url)));
}

#[tokio::test]
async fn test_relative_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/start/index"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/home/"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/home/"))
        .respond_with(html(
            r#"<a href="about">About</a><a href="/top">Top</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/home/about"))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/top"))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Resolving against the pre-redirect URL would land here
    Mock::given(method("GET"))
        .and(path("/start/about"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/start/index", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.errored, 0);
    assert_eq!(report.stats.checked, 3);
}

#[tokio::test]
async fn test_off_domain_links_never_fetched() {
    let mock_server = MockServer::start().await;
    let foreign_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Same machine, different host name: outside the 127.0.0.1 scope
    let foreign_port = url::Url::parse(&foreign_server.uri())
        .unwrap()
        .port()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<a href="http://localhost:{}/page">Elsewhere</a>
               <a href="ftp://127.0.0.1/file">FTP</a>
               <a href="javascript:void(0)">JS</a>"#,
            foreign_port
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&foreign_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.discovered, 1);
    assert_eq!(report.stats.errored, 0);
}

#[tokio::test]
async fn test_redirect_off_domain_not_followed() {
    let mock_server = MockServer::start().await;
    let foreign_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let foreign_port = url::Url::parse(&foreign_server.uri())
        .unwrap()
        .port()
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/out">Out</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "Location",
            format!("http://localhost:{}/elsewhere", foreign_port).as_str(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html(r#"<a href="/deeper">d</a>"#.to_string()))
        .expect(0)
        .mount(&foreign_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.checked, 2);
    assert_eq!(report.stats.errored, 1);

    let lines = error_lines(&log_path);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&format!("{}/out - redirected out of scope - ", base_url)));
}

#[tokio::test]
async fn test_in_scope_redirect_chain_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/loop">Loop</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.errored, 1);

    let lines = error_lines(&log_path);
    assert!(lines[0].starts_with(&format!("{}/loop - too many redirects - ", base_url)));
}

#[tokio::test]
async fn test_non_markup_resource_not_descended() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<link href="/logo.png">"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"href="/hidden""#, "image/png"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.checked, 2);
    assert_eq!(report.stats.errored, 0);
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r##"<a href="/a#sec1">1</a><a href="/a#sec2">2</a><a href="#top">top</a>"##
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let report = crawl(config).await.expect("Crawl failed");
    assert_eq!(report.stats.discovered, 2);
}

#[tokio::test]
async fn test_configured_headers_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/", base_url);

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("x-probe", "reachcheck"))
        .and(header("referer", seed.as_str()))
        .respond_with(html(String::new()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");
    let config_path = dir.path().join("reachcheck.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawl]
seed-url = "{seed}"
domain-suffix = "127.0.0.1"
worker-count = 2
progress = false

[output]
log-path = "{log}"

[headers]
"X-Probe" = "reachcheck"
"#,
            seed = seed,
            log = log_path.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).expect("Failed to load config");
    let report = crawl(config).await.expect("Crawl failed");

    // A missing header would fall through to wiremock's default 404
    assert_eq!(report.stats.errored, 0);
}

#[tokio::test]
async fn test_log_appends_across_sessions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/gone">g</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("url_error.log");

    for _ in 0..2 {
        let config = create_test_config(&format!("{}/", base_url), &log_path);
        crawl(config).await.expect("Crawl failed");
    }

    let content = std::fs::read_to_string(&log_path).unwrap();
    let headers = content.lines().filter(|l| l.starts_with("# ")).count();
    assert_eq!(headers, 2);
    assert_eq!(error_lines(&log_path).len(), 2);
}

#[tokio::test]
async fn test_coordinator_with_explicit_sink() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/missing">m</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("custom.log");
    let config = create_test_config(&format!("{}/", base_url), &log_path);

    let fetcher = HttpFetcher::new(&config).unwrap();
    let sink = FileSink::open(&log_path).unwrap();
    let report = Coordinator::new(config, fetcher, sink)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.log.written, 1);
    assert_eq!(error_lines(&log_path).len(), 1);
}

#[tokio::test]
async fn test_unwritable_log_path_is_startup_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(html(String::new()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let log_path = dir.path().join("no-such-dir").join("url_error.log");
    let config = create_test_config(&format!("{}/", mock_server.uri()), &log_path);

    assert!(matches!(crawl(config).await, Err(ReachError::Io(_))));
}
