// Report generation from crawl results

use chrono::{DateTime, Utc};
use deadlink_scanner::{BrokenLinkRecord, CrawlSummary, StopReason};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
    Csv,
    Html,
    Markdown,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "html" => Some(ReportFormat::Html),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text/plain",
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
            ReportFormat::Html => "text/html",
            ReportFormat::Markdown => "text/markdown",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub start_url: String,
    pub scan_date: DateTime<Utc>,
    pub pages_visited: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    pub broken_links: Vec<BrokenLinkRecord>,
}

impl ReportData {
    pub fn new(
        start_url: &str,
        scan_date: DateTime<Utc>,
        broken_links: Vec<BrokenLinkRecord>,
    ) -> Self {
        Self {
            start_url: start_url.to_string(),
            scan_date,
            pages_visited: 0,
            stop_reason: None,
            broken_links,
        }
    }

    pub fn from_summary(start_url: &str, scan_date: DateTime<Utc>, summary: &CrawlSummary) -> Self {
        Self {
            start_url: start_url.to_string(),
            scan_date,
            pages_visited: summary.pages_visited(),
            stop_reason: Some(summary.stop_reason),
            broken_links: summary.broken_links.clone(),
        }
    }

    pub fn connection_errors(&self) -> usize {
        self.broken_links
            .iter()
            .filter(|r| r.is_connection_error())
            .count()
    }

    fn format_scan_date(&self) -> String {
        self.scan_date.format("%Y-%m-%d %H:%M:%S UTC").to_string()
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn render_report(format: ReportFormat, data: &ReportData) -> Result<String, ReportError> {
    Ok(match format {
        ReportFormat::Text => generate_text_report(data),
        ReportFormat::Json => generate_json_report(data)?,
        ReportFormat::Csv => generate_csv_report(data)?,
        ReportFormat::Html => generate_html_report(data),
        ReportFormat::Markdown => generate_markdown_report(data),
    })
}

pub fn generate_text_report(data: &ReportData) -> String {
    let mut report = String::new();

    // Header
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                          BROKEN LINKS REPORT\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    report.push_str(&format!("Start URL:    {}\n", data.start_url));
    report.push_str(&format!("Scan Date:    {}\n", data.format_scan_date()));
    if data.pages_visited > 0 {
        report.push_str(&format!("Pages Found:  {}\n", data.pages_visited));
    }
    if let Some(reason) = data.stop_reason {
        report.push_str(&format!("Stopped:      {}\n", reason));
    }
    report.push_str(&format!("Broken Links: {}\n", data.broken_links.len()));
    if data.connection_errors() > 0 {
        report.push_str(&format!("  of which connection errors: {}\n", data.connection_errors()));
    }
    report.push('\n');

    if data.broken_links.is_empty() {
        report.push_str("No broken links found.\n\n");
    } else {
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
        report.push_str("BROKEN LINKS\n");
        report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

        for (idx, record) in data.broken_links.iter().enumerate() {
            report.push_str(&format!("[{}] {}\n", idx + 1, record.url));
            report.push_str(&format!("Status:       {}\n", record.status_label()));
            if record.referred_from.is_empty() {
                report.push_str("Referred From: N/A\n");
            } else {
                report.push_str("Referred From:\n");
                for referrer in &record.referred_from {
                    report.push_str(&format!("  - {}\n", referrer));
                }
            }
            report.push_str("\n────────────────────────────────────────────────────────────────────────────────\n\n");
        }
    }

    // Footer
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("                          End of Report\n");
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report.push_str("\nGenerated by deadlink\n\n");

    report
}

/// The JSON data file is the bare list of records, one object per broken link.
pub fn generate_json_report(data: &ReportData) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&data.broken_links)
}

pub fn generate_csv_report(data: &ReportData) -> Result<String, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["url", "status_code", "referred_from"])?;

    for record in &data.broken_links {
        let referrers = record
            .referred_from
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        writer.write_record([
            record.url.as_str(),
            record.status_label().as_str(),
            referrers.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

pub fn generate_html_report(data: &ReportData) -> String {
    let mut html = String::new();

    html.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Broken Links Report</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 20px; }
        h1, h2 { color: #333; }
        .summary { background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin-bottom: 20px; }
        table { border-collapse: collapse; width: 100%; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #f2f2f2; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        .status-error { color: #d9534f; }
        .status-warning { color: #f0ad4e; }
    </style>
</head>
<body>
    <h1>Broken Links Report</h1>
"#,
    );

    html.push_str("    <div class=\"summary\">\n");
    html.push_str(&format!(
        "        <p><strong>Start URL:</strong> {}</p>\n",
        html_escape(&data.start_url)
    ));
    html.push_str(&format!(
        "        <p><strong>Scan Date:</strong> {}</p>\n",
        data.format_scan_date()
    ));
    if data.pages_visited > 0 {
        html.push_str(&format!(
            "        <p><strong>Pages Crawled:</strong> {}</p>\n",
            data.pages_visited
        ));
    }
    html.push_str(&format!(
        "        <p><strong>Total Broken Links Found:</strong> {}</p>\n",
        data.broken_links.len()
    ));
    html.push_str("    </div>\n\n    <h2>Broken Links</h2>\n");

    if data.broken_links.is_empty() {
        html.push_str("    <p>No broken links found.</p>\n");
    } else {
        html.push_str("    <table>\n        <tr>\n            <th>URL</th>\n            <th>Status</th>\n            <th>Referred From</th>\n        </tr>\n");

        for record in &data.broken_links {
            // HTTP errors are errors, unreachable hosts only a warning
            let status_class = if record.is_connection_error() {
                "status-warning"
            } else {
                "status-error"
            };
            let referring = if record.referred_from.is_empty() {
                "N/A".to_string()
            } else {
                record
                    .referred_from
                    .iter()
                    .map(|r| html_escape(r.as_str()))
                    .collect::<Vec<_>>()
                    .join("<br>")
            };

            html.push_str(&format!(
                "        <tr>\n            <td>{}</td>\n            <td class=\"{}\">{}</td>\n            <td>{}</td>\n        </tr>\n",
                html_escape(record.url.as_str()),
                status_class,
                record.status_label(),
                referring
            ));
        }

        html.push_str("    </table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

pub fn generate_markdown_report(data: &ReportData) -> String {
    let mut report = String::new();
    report.push_str("# Broken Links Report\n\n");
    report.push_str(&format!("- **Start URL:** {}\n", data.start_url));
    report.push_str(&format!("- **Scan Date:** {}\n", data.format_scan_date()));
    if data.pages_visited > 0 {
        report.push_str(&format!("- **Pages Crawled:** {}\n", data.pages_visited));
    }
    report.push_str(&format!(
        "- **Total Broken Links Found:** {}\n\n",
        data.broken_links.len()
    ));

    if data.broken_links.is_empty() {
        report.push_str("No broken links found.\n");
        return report;
    }

    report.push_str("| URL | Status | Referred From |\n");
    report.push_str("|-----|--------|---------------|\n");
    for record in &data.broken_links {
        let referring = if record.referred_from.is_empty() {
            "N/A".to_string()
        } else {
            record
                .referred_from
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join("<br>")
        };
        report.push_str(&format!(
            "| {} | {} | {} |\n",
            record.url.as_str().replace('|', "\\|"),
            record.status_label(),
            referring.replace('|', "\\|")
        ));
    }

    report
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Helper functions
fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
