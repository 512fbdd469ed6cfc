use colored::Colorize;
use deadlink_scanner::{
    BatchProgress, BrokenLinkRecord, CrawlConfig, CrawlSummary, Crawler, ScanError,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Execute a crawl with the given options
/// Returns the crawl summary
pub async fn execute_crawl(
    options: CrawlOptions,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary, ScanError> {
    let CrawlOptions {
        config,
        show_progress_bars,
    } = options;

    // Single spinner for the whole crawl (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let callback_clone = progress_callback.clone();
    let batch_callback: deadlink_scanner::ProgressCallback =
        Arc::new(move |progress: &BatchProgress| {
            let message = format_batch_progress(progress);
            if let Some(ref pb) = pb_clone {
                pb.set_message(message.clone());
                pb.tick();
            }
            if let Some(ref callback) = callback_clone {
                callback(message);
            }
        });

    let pb_clone = progress_bar.clone();
    let result_callback: deadlink_scanner::ResultCallback =
        Arc::new(move |record: &BrokenLinkRecord| {
            if let Some(ref pb) = pb_clone {
                pb.println(format!(
                    "  {} {} {}",
                    "✗".red().bold(),
                    format_status(record),
                    record.url
                ));
            }
        });

    let crawler = Crawler::new(config)?
        .with_progress_callback(batch_callback)
        .with_result_callback(result_callback);

    let result = crawler.run().await;

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        match result {
            Ok(ref summary) => pb.finish_with_message(format!(
                "Crawl complete! {} pages visited, {} broken links",
                summary.pages_visited(),
                summary.broken_links.len()
            )),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result
}

fn format_batch_progress(progress: &BatchProgress) -> String {
    format!(
        "Batch {} ({} URLs): {} visited, {} queued, {} broken",
        progress.batch, progress.batch_size, progress.visited, progress.queued, progress.broken
    )
}

/// Colored status for console output
pub fn format_status(record: &BrokenLinkRecord) -> String {
    match record.status_code {
        Some(code @ 400..=499) => code.to_string().yellow().to_string(),
        Some(code) => code.to_string().red().to_string(),
        None => "Connection Error".red().bold().to_string(),
    }
}

/// Generate a console summary from crawl results
pub fn generate_crawl_summary(start_url: &str, summary: &CrawlSummary) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Start URL: {}\n", start_url));
    report.push_str(&format!("  Pages crawled: {}\n", summary.pages_visited()));
    report.push_str(&format!("  Batches: {}\n", summary.batches));
    report.push_str(&format!("  Stopped: {}\n", summary.stop_reason));
    report.push_str(&format!("  Broken links: {}\n", summary.broken_links.len()));
    report.push_str(&format!(
        "  Elapsed: {:.1}s\n",
        summary.elapsed.as_secs_f64()
    ));

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    if summary.broken_links.is_empty() {
        report.push_str(&format!("  {} No broken links found\n", "✓".green().bold()));
        return report;
    }

    for record in &summary.broken_links {
        report.push_str(&format!(
            "  {} {}\n",
            format_status(record),
            extract_url_path(record.url.as_str())
        ));

        for referrer in &record.referred_from {
            report.push_str(&format!(
                "      {} {}\n",
                "←".bright_black(),
                extract_url_path(referrer.as_str()).bright_black()
            ));
        }
    }
    report.push('\n');

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use deadlink_scanner::{CrawlTarget, StopReason};
    use std::time::Duration;

    fn summary(broken_links: Vec<BrokenLinkRecord>) -> CrawlSummary {
        CrawlSummary {
            broken_links,
            visited: vec![CrawlTarget::parse("https://example.com/").unwrap()],
            batches: 1,
            stop_reason: StopReason::FrontierExhausted,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_summary_without_broken_links() {
        colored::control::set_override(false);
        let text = generate_crawl_summary("https://example.com/", &summary(vec![]));
        assert!(text.contains("Pages crawled: 1"));
        assert!(text.contains("Broken links: 0"));
        assert!(text.contains("No broken links found"));
    }

    #[test]
    fn test_summary_lists_paths_and_referrers() {
        colored::control::set_override(false);
        let record = BrokenLinkRecord::new(
            CrawlTarget::parse("https://example.com/missing").unwrap(),
            None,
            vec![CrawlTarget::parse("https://example.com/docs").unwrap()],
        );
        let text = generate_crawl_summary("https://example.com/", &summary(vec![record]));
        assert!(text.contains("Connection Error /missing"));
        assert!(text.contains("← /docs"));
    }
}
