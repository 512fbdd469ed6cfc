//! Persisting rendered reports.
//!
//! Storage never feeds back into a crawl: callers get either the locations
//! the reports were written to or a [`StorageError`] to report upward.

use crate::report::{
    ReportData, ReportFormat, generate_html_report, generate_json_report, save_report,
};
use chrono::NaiveDate;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Somewhere rendered reports can be written to.
pub trait ReportSink {
    /// Store `content` under `key` and return a description of where it went.
    fn store(&self, key: &str, content: &str, content_type: &str) -> Result<String, StorageError>;
}

/// Writes reports as files below a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(StorageError::InvalidDestination(
                "destination directory is empty".to_string(),
            ));
        }
        Ok(Self { root })
    }
}

impl ReportSink for DirectorySink {
    fn store(&self, key: &str, content: &str, _content_type: &str) -> Result<String, StorageError> {
        let relative = Path::new(key);
        let escapes_root = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes_root {
            return Err(StorageError::InvalidDestination(format!(
                "report key '{}' must be a relative path inside the destination",
                key
            )));
        }

        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        save_report(content, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        info!("Saved report to {}", path.display());
        Ok(path.display().to_string())
    }
}

/// Names of the HTML report and the JSON data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportKeys {
    pub html: String,
    pub json: String,
}

impl ReportKeys {
    /// `2024-05-01_broken_links_report.html`, used by the CLI.
    pub fn flat(date: NaiveDate) -> Self {
        let date = date.format("%Y-%m-%d");
        Self {
            html: format!("{}_broken_links_report.html", date),
            json: format!("{}_broken_links_data.json", date),
        }
    }

    /// `reports/2024-05-01/broken_links_report.html`, used by event invocations.
    pub fn dated(date: NaiveDate) -> Self {
        let date = date.format("%Y-%m-%d");
        Self {
            html: format!("reports/{}/broken_links_report.html", date),
            json: format!("reports/{}/broken_links_data.json", date),
        }
    }
}

/// Where [`publish_reports`] put each artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedReports {
    pub html_report: String,
    pub json_data: String,
}

/// Render the HTML report and the JSON data file and store both.
pub fn publish_reports(
    sink: &dyn ReportSink,
    data: &ReportData,
    keys: &ReportKeys,
) -> Result<PublishedReports, StorageError> {
    let html = generate_html_report(data);
    let json = generate_json_report(data)?;

    let html_report = sink.store(&keys.html, &html, ReportFormat::Html.content_type())?;
    let json_data = sink.store(&keys.json, &json, ReportFormat::Json.content_type())?;

    Ok(PublishedReports {
        html_report,
        json_data,
    })
}
