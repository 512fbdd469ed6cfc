use crate::error::Result;
use crate::normalize::{CrawlTarget, normalize};
use crate::result::FetchOutcome;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fetches one page and classifies the response.
///
/// Redirects are never followed: a 3xx ends that branch of the crawl. Every
/// failure is turned into a [`FetchOutcome`], so `fetch` itself cannot fail.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, target: &CrawlTarget) -> FetchOutcome {
        debug!("Fetching {}", target);

        let response = match self.client.get(target.as_str()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Error checking {}: {}", target, e);
                return FetchOutcome::connection_failed(describe_transport_error(&e));
            }
        };

        let status = response.status();
        let code = status.as_u16();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|loc| target.as_url().join(loc).ok());
            match location {
                Some(location) => info!("Redirect: {} -> {} ({})", target, location, code),
                None => info!("Redirect without location: {} ({})", target, code),
            }
            return FetchOutcome::fetched(code, Vec::new());
        }

        if code >= 400 {
            warn!("Broken link found: {} (Status: {})", target, code);
            return FetchOutcome::fetched(code, Vec::new());
        }

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_lowercase().contains("text/html"))
            .unwrap_or(false);

        if !is_html {
            debug!("Skipping non-HTML body of {}", target);
            return FetchOutcome::fetched(code, Vec::new());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Error reading body of {}: {}", target, e);
                return FetchOutcome::connection_failed(describe_transport_error(&e));
            }
        };

        let links = extract_links(&body, target);
        debug!("Found {} link(s) on {}", links.len(), target);

        FetchOutcome::fetched(code, links)
    }
}

/// Resolve and normalize every `<a href>` in `html` relative to `page`.
///
/// Same-page anchors and non-http links are dropped. Malformed markup yields
/// whatever links the parser could recover, possibly none.
pub fn extract_links(html: &str, page: &CrawlTarget) -> Vec<CrawlTarget> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| normalize(href, page))
        .collect()
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("connection failed: {}", e)
    } else {
        e.to_string()
    }
}
