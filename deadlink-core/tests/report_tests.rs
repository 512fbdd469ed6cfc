// Tests for report generation functionality

use chrono::{TimeZone, Utc};
use deadlink_core::report::{
    ReportData, ReportFormat, generate_csv_report, generate_html_report, generate_json_report,
    generate_markdown_report, generate_text_report, render_report, save_report,
};
use deadlink_scanner::{BrokenLinkRecord, CrawlTarget};
use tempfile::TempDir;

fn target(url: &str) -> CrawlTarget {
    CrawlTarget::parse(url).unwrap()
}

fn sample_data() -> ReportData {
    let scan_date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    ReportData::new(
        "https://example.com/",
        scan_date,
        vec![
            BrokenLinkRecord::new(
                target("https://example.com/missing"),
                Some(404),
                vec![target("https://example.com/"), target("https://example.com/docs")],
            ),
            BrokenLinkRecord::new(target("https://example.com/down"), None, vec![]),
        ],
    )
}

fn empty_data() -> ReportData {
    let scan_date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
    ReportData::new("https://example.com/", scan_date, vec![])
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("csv"), Some(ReportFormat::Csv));
    assert_eq!(ReportFormat::from_str("html"), Some(ReportFormat::Html));
    assert_eq!(ReportFormat::from_str("markdown"), Some(ReportFormat::Markdown));
    assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("HTML"), Some(ReportFormat::Html));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("invalid").is_none());
    assert!(ReportFormat::from_str("pdf").is_none());
}

#[test]
fn test_report_format_content_types() {
    assert_eq!(ReportFormat::Html.content_type(), "text/html");
    assert_eq!(ReportFormat::Json.content_type(), "application/json");
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_is_bare_record_list() {
    let json = generate_json_report(&sample_data()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        value,
        serde_json::json!([
            {
                "url": "https://example.com/missing",
                "status_code": 404,
                "referred_from": ["https://example.com/", "https://example.com/docs"]
            },
            {
                "url": "https://example.com/down",
                "status_code": null,
                "referred_from": []
            }
        ])
    );
}

#[test]
fn test_json_report_reads_back_into_records() {
    let data = sample_data();
    let json = generate_json_report(&data).unwrap();
    let records: Vec<BrokenLinkRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(records, data.broken_links);
}

#[test]
fn test_json_report_empty() {
    let json = generate_json_report(&empty_data()).unwrap();
    assert_eq!(json.trim(), "[]");
}

// ============================================================================
// Human Readable Report Tests
// ============================================================================

#[test]
fn test_text_report_contents() {
    let report = generate_text_report(&sample_data());

    assert!(report.contains("BROKEN LINKS REPORT"));
    assert!(report.contains("Start URL:    https://example.com/"));
    assert!(report.contains("Scan Date:    2024-05-01 12:30:00 UTC"));
    assert!(report.contains("Broken Links: 2"));
    assert!(report.contains("[1] https://example.com/missing"));
    assert!(report.contains("Status:       404"));
    assert!(report.contains("  - https://example.com/docs"));
    assert!(report.contains("[2] https://example.com/down"));
    assert!(report.contains("Status:       Connection Error"));
    assert!(report.contains("Referred From: N/A"));
}

#[test]
fn test_text_report_empty() {
    let report = generate_text_report(&empty_data());
    assert!(report.contains("Broken Links: 0"));
    assert!(report.contains("No broken links found."));
}

#[test]
fn test_html_report_contents() {
    let report = generate_html_report(&sample_data());

    assert!(report.starts_with("<!DOCTYPE html>"));
    assert!(report.contains("<strong>Total Broken Links Found:</strong> 2"));
    assert!(report.contains("<td class=\"status-error\">404</td>"));
    assert!(report.contains("<td class=\"status-warning\">Connection Error</td>"));
    assert!(report.contains("https://example.com/<br>https://example.com/docs"));
    assert!(report.contains("<td>N/A</td>"));
}

#[test]
fn test_html_report_escapes_values() {
    let scan_date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let data = ReportData::new(
        "https://example.com/?q=<script>&x=\"1\"",
        scan_date,
        vec![BrokenLinkRecord::new(
            target("https://example.com/search?a=1&b=2"),
            Some(500),
            vec![],
        )],
    );

    let report = generate_html_report(&data);
    assert!(!report.contains("<script>"));
    assert!(report.contains("&lt;script&gt;"));
    assert!(report.contains("search?a=1&amp;b=2"));
}

#[test]
fn test_html_report_empty() {
    let report = generate_html_report(&empty_data());
    assert!(report.contains("No broken links found."));
    assert!(!report.contains("<table>"));
}

#[test]
fn test_markdown_report_table() {
    let report = generate_markdown_report(&sample_data());
    assert!(report.starts_with("# Broken Links Report"));
    assert!(report.contains("| URL | Status | Referred From |"));
    assert!(report.contains("| https://example.com/missing | 404 | https://example.com/<br>https://example.com/docs |"));
    assert!(report.contains("| https://example.com/down | Connection Error | N/A |"));
}

#[test]
fn test_csv_report_rows() {
    let report = generate_csv_report(&sample_data()).unwrap();
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines[0], "url,status_code,referred_from");
    assert_eq!(
        lines[1],
        "https://example.com/missing,404,https://example.com/ https://example.com/docs"
    );
    assert_eq!(lines[2], "https://example.com/down,Connection Error,");
}

#[test]
fn test_csv_report_quotes_commas() {
    let scan_date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
    let data = ReportData::new(
        "https://example.com/",
        scan_date,
        vec![BrokenLinkRecord::new(target("https://example.com/a,b"), Some(404), vec![])],
    );

    let report = generate_csv_report(&data).unwrap();
    assert!(report.contains("\"https://example.com/a,b\",404,"));
}

#[test]
fn test_csv_report_reads_back() {
    let report = generate_csv_report(&sample_data()).unwrap();
    let mut reader = csv::Reader::from_reader(report.as_bytes());

    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), ["url", "status_code", "referred_from"]);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "https://example.com/missing");
    assert_eq!(&rows[0][2], "https://example.com/ https://example.com/docs");
    assert_eq!(&rows[1][1], "Connection Error");
    assert_eq!(&rows[1][2], "");
}

#[test]
fn test_csv_report_empty_has_header_only() {
    let report = generate_csv_report(&empty_data()).unwrap();
    assert_eq!(report.trim_end(), "url,status_code,referred_from");
}

#[test]
fn test_render_report_dispatches_on_format() {
    let data = sample_data();
    assert_eq!(
        render_report(ReportFormat::Html, &data).unwrap(),
        generate_html_report(&data)
    );
    assert_eq!(
        render_report(ReportFormat::Text, &data).unwrap(),
        generate_text_report(&data)
    );
    assert_eq!(
        render_report(ReportFormat::Json, &data).unwrap(),
        generate_json_report(&data).unwrap()
    );
}

#[test]
fn test_connection_error_count() {
    assert_eq!(sample_data().connection_errors(), 1);
    assert_eq!(empty_data().connection_errors(), 0);
}

// ============================================================================
// Save Report Tests
// ============================================================================

#[test]
fn test_save_report_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.txt");

    save_report("hello", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn test_save_report_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope").join("report.txt");
    assert!(save_report("hello", &path).is_err());
}
