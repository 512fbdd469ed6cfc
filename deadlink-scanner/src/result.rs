use crate::normalize::CrawlTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Most referrers kept on a single [`BrokenLinkRecord`].
pub const MAX_REFERRERS: usize = 5;

/// What a single fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered. `links` is empty unless the page was a 2xx HTML document.
    Fetched { status: u16, links: Vec<CrawlTarget> },
    /// No HTTP status was received: timeout, DNS failure, refused connection.
    ConnectionFailed { reason: String },
}

impl FetchOutcome {
    pub fn fetched(status: u16, links: Vec<CrawlTarget>) -> Self {
        FetchOutcome::Fetched { status, links }
    }

    pub fn connection_failed(reason: impl Into<String>) -> Self {
        FetchOutcome::ConnectionFailed {
            reason: reason.into(),
        }
    }

    /// `None` means the request never got a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchOutcome::Fetched { status, .. } => Some(*status),
            FetchOutcome::ConnectionFailed { .. } => None,
        }
    }

    /// Transport failures and 4xx/5xx statuses are broken links. Redirects are not.
    pub fn is_failure(&self) -> bool {
        match self {
            FetchOutcome::Fetched { status, .. } => *status >= 400,
            FetchOutcome::ConnectionFailed { .. } => true,
        }
    }

    pub fn into_links(self) -> Vec<CrawlTarget> {
        match self {
            FetchOutcome::Fetched { links, .. } => links,
            FetchOutcome::ConnectionFailed { .. } => Vec::new(),
        }
    }
}

/// A dead or erroring link together with pages that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenLinkRecord {
    pub url: CrawlTarget,
    /// `None` for connection failures.
    pub status_code: Option<u16>,
    pub referred_from: Vec<CrawlTarget>,
}

impl BrokenLinkRecord {
    pub fn new(
        url: CrawlTarget,
        status_code: Option<u16>,
        mut referred_from: Vec<CrawlTarget>,
    ) -> Self {
        referred_from.truncate(MAX_REFERRERS);
        Self {
            url,
            status_code,
            referred_from,
        }
    }

    pub fn is_connection_error(&self) -> bool {
        self.status_code.is_none()
    }

    /// Status as shown to people: the code, or "Connection Error".
    pub fn status_label(&self) -> String {
        match self.status_code {
            Some(code) => code.to_string(),
            None => "Connection Error".to_string(),
        }
    }
}

/// Why the crawl loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    FrontierExhausted,
    BudgetReached,
    DeadlineReached,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FrontierExhausted => write!(f, "no pages left to visit"),
            StopReason::BudgetReached => write!(f, "page budget reached"),
            StopReason::DeadlineReached => write!(f, "deadline reached"),
        }
    }
}

/// Everything a finished crawl reports.
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    /// In order of discovery, batch by batch.
    pub broken_links: Vec<BrokenLinkRecord>,
    /// Every page dequeued for fetching, in visit order.
    pub visited: Vec<CrawlTarget>,
    pub batches: usize,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

impl CrawlSummary {
    pub fn pages_visited(&self) -> usize {
        self.visited.len()
    }
}
