use anyhow::{Context, Result};
use chrono::Utc;
use clap::ArgMatches;
use colored::Colorize;
use deadlink_core::crawl::{CrawlOptions, execute_crawl, generate_crawl_summary};
use deadlink_core::invoke::{InvocationEvent, InvocationResponse, handle_invocation, process_env};
use deadlink_core::report::{ReportData, ReportFormat, render_report};
use deadlink_core::storage::{DirectorySink, PublishedReports, ReportKeys, publish_reports};
use deadlink_scanner::{CrawlConfig, ReferrerMode};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use url::Url;

/// No broken links were found.
pub const EXIT_CLEAN: i32 = 0;
/// The crawl finished and found broken links.
pub const EXIT_BROKEN_LINKS: i32 = 1;
/// The crawl could not run or its reports could not be written.
pub const EXIT_ERROR: i32 = 2;

/// Install the fmt subscriber. `RUST_LOG` overrides the default level.
pub fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Fails only when a global subscriber is already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Build the engine configuration from `crawl` arguments
pub fn crawl_config_from_args(args: &ArgMatches) -> Result<CrawlConfig> {
    let url = args
        .get_one::<Url>("url")
        .context("--url is required")?;

    let exclude_patterns: Vec<String> = args
        .get_many::<String>("exclude")
        .map(|patterns| patterns.cloned().collect())
        .unwrap_or_default();

    let referrers = args
        .get_one::<String>("referrers")
        .map(String::as_str)
        .unwrap_or("inbound");
    let referrer_mode = ReferrerMode::from_str(referrers)
        .with_context(|| format!("Unknown referrer mode '{}'", referrers))?;

    let mut config = CrawlConfig::new(url.as_str())
        .with_exclude_patterns(exclude_patterns)
        .with_referrer_mode(referrer_mode);

    if let Some(max_pages) = args.get_one::<usize>("max-pages") {
        config = config.with_max_pages(*max_pages);
    }
    if let Some(threads) = args.get_one::<usize>("threads") {
        config = config.with_concurrency(*threads);
    }
    if let Some(timeout) = args.get_one::<u64>("timeout") {
        config = config.with_timeout(Duration::from_secs(*timeout));
    }
    if let Some(deadline) = args.get_one::<u64>("deadline") {
        config = config.with_deadline(Duration::from_secs(*deadline));
    }

    config.validate().context("Invalid crawl options")?;
    Ok(config)
}

/// Resolve `--output-dir`, expanding `~`
pub fn output_dir_from_args(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("output-dir")
        .map(String::as_str)
        .unwrap_or("reports");
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub async fn handle_crawl(args: &ArgMatches, quiet: bool) -> Result<i32> {
    let config = crawl_config_from_args(args)?;
    let format = match args.get_one::<String>("format") {
        Some(name) => Some(
            ReportFormat::from_str(name)
                .with_context(|| format!("Unknown report format '{}'", name))?,
        ),
        None => None,
    };

    let start_url = config.start_url.clone();
    if !quiet {
        println!("{} {}", "Crawling".bold(), start_url.bright_cyan());
        println!("Workers: {}", config.concurrency);
        println!("Max pages: {}", config.max_pages);
        if !config.exclude_patterns.is_empty() {
            println!("Excluding: {}", config.exclude_patterns.join(", "));
        }
        println!();
    }

    let options = CrawlOptions {
        config,
        show_progress_bars: !quiet,
    };
    let summary = execute_crawl(options, None)
        .await
        .with_context(|| format!("Crawl of {} failed", start_url))?;

    let scan_date = Utc::now();
    let data = ReportData::from_summary(&start_url, scan_date, &summary);

    match format {
        Some(format) => {
            let report = render_report(format, &data).context("Failed to render report")?;
            print!("{}", report);
        }
        None => print!("{}", generate_crawl_summary(&start_url, &summary)),
    }

    if !args.get_flag("no-save") {
        let output_dir = output_dir_from_args(args);
        let published = save_reports(&output_dir, &data)?;
        if !quiet {
            println!("{} HTML report: {}", "✓".green().bold(), published.html_report);
            println!("{} JSON data:   {}", "✓".green().bold(), published.json_data);
        }
    }

    Ok(exit_code_for(&data))
}

/// Write the HTML report and JSON data file into `output_dir`
pub fn save_reports(output_dir: &Path, data: &ReportData) -> Result<PublishedReports> {
    let sink = DirectorySink::new(output_dir)?;
    let keys = ReportKeys::flat(data.scan_date.date_naive());
    publish_reports(&sink, data, &keys)
        .with_context(|| format!("Failed to save reports to {}", output_dir.display()))
}

pub fn exit_code_for(data: &ReportData) -> i32 {
    if data.broken_links.is_empty() {
        EXIT_CLEAN
    } else {
        EXIT_BROKEN_LINKS
    }
}

pub async fn handle_invoke(args: &ArgMatches) -> Result<i32> {
    let raw = match args.get_one::<PathBuf>("event") {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?,
        _ => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read event from stdin")?;
            buffer
        }
    };

    let event = parse_event(&raw)?;
    debug!("Invocation event: {:?}", event);

    let response = handle_invocation(event, process_env).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("Failed to encode response")?
    );

    Ok(invoke_exit_code(&response))
}

/// An empty payload is an empty event, so settings come from the environment.
pub fn parse_event(raw: &str) -> Result<InvocationEvent> {
    if raw.trim().is_empty() {
        return Ok(InvocationEvent::default());
    }
    serde_json::from_str(raw).context("Event is not valid JSON")
}

pub fn invoke_exit_code(response: &InvocationResponse) -> i32 {
    if response.is_success() {
        EXIT_CLEAN
    } else {
        EXIT_ERROR
    }
}
