//! Event-triggered entry point.
//!
//! An invocation carries its configuration in a JSON event, with the process
//! environment as fallback. Missing required settings are answered with a 400
//! before any crawling starts.

use crate::crawl::{CrawlOptions, execute_crawl};
use crate::report::ReportData;
use crate::storage::{DirectorySink, ReportKeys, publish_reports};
use chrono::Utc;
use deadlink_scanner::CrawlConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

pub const ENV_START_URL: &str = "START_URL";
pub const ENV_EXCLUDE_PATTERNS: &str = "EXCLUDE_PATTERNS";
pub const ENV_MAX_PAGES: &str = "MAX_PAGES";
pub const ENV_CONCURRENCY: &str = "CONCURRENCY";
pub const ENV_DESTINATION: &str = "REPORT_DESTINATION";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationEvent {
    pub start_url: Option<String>,
    pub exclude_patterns: Option<Vec<String>>,
    pub max_pages: Option<usize>,
    pub concurrency: Option<usize>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvocationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub config: CrawlConfig,
    pub destination: String,
}

/// Merge the event with environment fallbacks. Event values win.
pub fn resolve_request<F>(
    event: &InvocationEvent,
    env: F,
) -> Result<InvocationRequest, InvocationError>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |value: &Option<String>, key: &str| {
        value
            .clone()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env(key).filter(|v| !v.trim().is_empty()))
    };

    let start_url = lookup(&event.start_url, ENV_START_URL)
        .ok_or(InvocationError::MissingField("start_url"))?;
    let destination = lookup(&event.destination, ENV_DESTINATION)
        .ok_or(InvocationError::MissingField("destination"))?;

    let exclude_patterns = match event.exclude_patterns.clone().filter(|p| !p.is_empty()) {
        Some(patterns) => patterns,
        None => match env(ENV_EXCLUDE_PATTERNS) {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<String>>(&raw)
                .map_err(|e| InvocationError::InvalidField {
                    field: "exclude_patterns",
                    reason: e.to_string(),
                })?,
            _ => Vec::new(),
        },
    };

    let mut config = CrawlConfig::new(start_url).with_exclude_patterns(exclude_patterns);

    if let Some(max_pages) = number_setting(event.max_pages, &env, ENV_MAX_PAGES, "max_pages")? {
        config = config.with_max_pages(max_pages);
    }
    let concurrency = number_setting(event.concurrency, &env, ENV_CONCURRENCY, "concurrency")?;
    if let Some(concurrency) = concurrency {
        config = config.with_concurrency(concurrency);
    }

    config.validate().map_err(|e| InvocationError::InvalidField {
        field: "configuration",
        reason: e.to_string(),
    })?;

    Ok(InvocationRequest {
        config,
        destination,
    })
}

fn number_setting<F>(
    from_event: Option<usize>,
    env: &F,
    key: &str,
    field: &'static str,
) -> Result<Option<usize>, InvocationError>
where
    F: Fn(&str) -> Option<String>,
{
    if from_event.is_some() {
        return Ok(from_event);
    }

    match env(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| InvocationError::InvalidField {
                field,
                reason: format!("'{}': {}", raw, e),
            }),
        _ => Ok(None),
    }
}

/// Run one invocation end to end: resolve, crawl, render, store.
pub async fn handle_invocation<F>(event: InvocationEvent, env: F) -> InvocationResponse
where
    F: Fn(&str) -> Option<String>,
{
    let request = match resolve_request(&event, env) {
        Ok(request) => request,
        Err(e) => return InvocationResponse::new(400, e.to_string()),
    };

    let start_url = request.config.start_url.clone();
    info!("Invocation crawling {} into {}", start_url, request.destination);

    let options = CrawlOptions {
        config: request.config,
        show_progress_bars: false,
    };
    let summary = match execute_crawl(options, None).await {
        Ok(summary) => summary,
        Err(e) if e.is_client_error() => return InvocationResponse::new(400, e.to_string()),
        Err(e) => {
            error!("Invocation failed: {}", e);
            return InvocationResponse::new(500, format!("Error: {}", e));
        }
    };

    let scan_date = Utc::now();
    let data = ReportData::from_summary(&start_url, scan_date, &summary);
    let keys = ReportKeys::dated(scan_date.date_naive());

    let published = DirectorySink::new(&request.destination)
        .and_then(|sink| publish_reports(&sink, &data, &keys));
    let published = match published {
        Ok(published) => published,
        Err(e) => {
            error!("Invocation failed: {}", e);
            return InvocationResponse::new(500, format!("Error: {}", e));
        }
    };

    let body = serde_json::json!({
        "message": format!("Crawler completed. Found {} broken links.", summary.broken_links.len()),
        "html_report": published.html_report,
        "json_data": published.json_data,
        "broken_links_count": summary.broken_links.len(),
    });

    InvocationResponse::new(200, body.to_string())
}

/// Reads settings from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
