use chrono::Utc;
use deadlink::commands::command_argument_builder;
use deadlink::handlers::*;
use deadlink_core::invoke::InvocationResponse;
use deadlink_core::report::ReportData;
use deadlink_scanner::{BrokenLinkRecord, CrawlTarget, ReferrerMode};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawl_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["deadlink", "crawl"];
    argv.extend_from_slice(args);
    let matches = command_argument_builder()
        .try_get_matches_from(argv)
        .unwrap();
    matches.subcommand_matches("crawl").unwrap().clone()
}

// ============================================================================
// Argument Parsing Tests
// ============================================================================

#[test]
fn test_crawl_requires_url() {
    let result = command_argument_builder().try_get_matches_from(["deadlink", "crawl"]);
    assert!(result.is_err());
}

#[test]
fn test_crawl_rejects_invalid_url() {
    let result =
        command_argument_builder().try_get_matches_from(["deadlink", "crawl", "-u", "not a url"]);
    assert!(result.is_err());
}

#[test]
fn test_crawl_rejects_unknown_format() {
    let result = command_argument_builder().try_get_matches_from([
        "deadlink",
        "crawl",
        "-u",
        "https://example.com/",
        "--format",
        "pdf",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_crawl_config_defaults() {
    let args = crawl_matches(&["-u", "https://example.com/"]);
    let config = crawl_config_from_args(&args).unwrap();

    assert_eq!(config.start_url, "https://example.com/");
    assert_eq!(config.max_pages, 100);
    assert_eq!(config.concurrency, 10);
    assert_eq!(config.request_timeout, Duration::from_secs(10));
    assert_eq!(config.referrer_mode, ReferrerMode::Inbound);
    assert!(config.exclude_patterns.is_empty());
    assert!(config.deadline.is_none());
}

#[test]
fn test_crawl_config_from_flags() {
    let args = crawl_matches(&[
        "--url",
        "https://example.com/docs",
        "-e",
        "/private",
        "--exclude",
        "/admin",
        "--max-pages",
        "20",
        "--threads",
        "4",
        "--timeout",
        "3",
        "--deadline",
        "60",
        "--referrers",
        "visited",
    ]);
    let config = crawl_config_from_args(&args).unwrap();

    assert_eq!(config.start_url, "https://example.com/docs");
    assert_eq!(config.exclude_patterns, vec!["/private", "/admin"]);
    assert_eq!(config.max_pages, 20);
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.request_timeout, Duration::from_secs(3));
    assert_eq!(config.deadline, Some(Duration::from_secs(60)));
    assert_eq!(config.referrer_mode, ReferrerMode::VisitedSnapshot);
}

#[test]
fn test_crawl_config_rejects_zero_threads() {
    let args = crawl_matches(&["-u", "https://example.com/", "--threads", "0"]);
    assert!(crawl_config_from_args(&args).is_err());
}

#[test]
fn test_quiet_is_global() {
    let matches = command_argument_builder()
        .try_get_matches_from(["deadlink", "crawl", "-u", "https://example.com/", "-q"])
        .unwrap();
    assert!(matches.get_flag("quiet"));
}

#[test]
fn test_output_dir_default_and_tilde() {
    let args = crawl_matches(&["-u", "https://example.com/"]);
    assert_eq!(output_dir_from_args(&args), std::path::PathBuf::from("reports"));

    let args = crawl_matches(&["-u", "https://example.com/", "-o", "~/deadlink-reports"]);
    let dir = output_dir_from_args(&args);
    assert!(!dir.to_string_lossy().starts_with('~'));
    assert!(dir.ends_with("deadlink-reports"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_exit_code_for_results() {
    let clean = ReportData::new("https://example.com/", Utc::now(), vec![]);
    assert_eq!(exit_code_for(&clean), EXIT_CLEAN);

    let broken = ReportData::new(
        "https://example.com/",
        Utc::now(),
        vec![BrokenLinkRecord::new(
            CrawlTarget::parse("https://example.com/gone").unwrap(),
            Some(404),
            vec![],
        )],
    );
    assert_eq!(exit_code_for(&broken), EXIT_BROKEN_LINKS);
}

#[test]
fn test_invoke_exit_code() {
    let ok = InvocationResponse {
        status_code: 200,
        body: "{}".to_string(),
    };
    let bad = InvocationResponse {
        status_code: 400,
        body: "start_url is required".to_string(),
    };
    assert_eq!(invoke_exit_code(&ok), EXIT_CLEAN);
    assert_eq!(invoke_exit_code(&bad), EXIT_ERROR);
}

// ============================================================================
// Event Parsing Tests
// ============================================================================

#[test]
fn test_parse_event_empty_input() {
    let event = parse_event("  \n").unwrap();
    assert!(event.start_url.is_none());
    assert!(event.destination.is_none());
}

#[test]
fn test_parse_event_fields() {
    let event = parse_event(
        r#"{"start_url": "https://example.com/", "exclude_patterns": ["/a"], "concurrency": 2}"#,
    )
    .unwrap();
    assert_eq!(event.start_url.as_deref(), Some("https://example.com/"));
    assert_eq!(event.exclude_patterns, Some(vec!["/a".to_string()]));
    assert_eq!(event.concurrency, Some(2));
}

#[test]
fn test_parse_event_invalid_json() {
    assert!(parse_event("{not json").is_err());
}

// ============================================================================
// Crawl Handler Tests
// ============================================================================

#[tokio::test]
async fn test_handle_crawl_saves_reports_and_returns_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><body><a href="/broken">broken</a></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/", server.uri());
    let output_dir = dir.path().to_str().unwrap().to_string();
    let args = crawl_matches(&["-u", &url, "-o", &output_dir]);

    let code = handle_crawl(&args, true).await.unwrap();
    assert_eq!(code, EXIT_BROKEN_LINKS);

    let date = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let html = dir.path().join(format!("{}_broken_links_report.html", date));
    let json = dir.path().join(format!("{}_broken_links_data.json", date));
    assert!(html.exists());

    let records: Vec<BrokenLinkRecord> =
        serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status_code, Some(500));
}

#[tokio::test]
async fn test_handle_crawl_no_save_clean_site() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let url = format!("{}/", server.uri());
    let output_dir = dir.path().join("out");
    let output_dir = output_dir.to_str().unwrap().to_string();
    let args = crawl_matches(&["-u", &url, "-o", &output_dir, "--no-save", "-f", "json"]);

    let code = handle_crawl(&args, true).await.unwrap();
    assert_eq!(code, EXIT_CLEAN);
    assert!(!dir.path().join("out").exists());
}
