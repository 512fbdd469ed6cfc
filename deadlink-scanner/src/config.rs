use crate::error::{Result, ScanError};
use std::time::Duration;

pub const DEFAULT_MAX_PAGES: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("deadlink/", env!("CARGO_PKG_VERSION"));

/// How `referred_from` is filled in on broken link records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferrerMode {
    /// Pages whose HTML actually linked to the broken URL.
    #[default]
    Inbound,
    /// The first pages visited in the crawl, whether or not they link to it.
    VisitedSnapshot,
}

impl ReferrerMode {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inbound" => Some(ReferrerMode::Inbound),
            "visited" | "snapshot" => Some(ReferrerMode::VisitedSnapshot),
            _ => None,
        }
    }
}

/// Engine input.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: String,
    pub exclude_patterns: Vec<String>,
    pub max_pages: usize,
    pub concurrency: usize,
    pub request_timeout: Duration,
    pub user_agent: String,
    pub referrer_mode: ReferrerMode,
    /// Checked between batches, never interrupts one.
    pub deadline: Option<Duration>,
}

impl CrawlConfig {
    pub fn new(start_url: impl Into<String>) -> Self {
        Self {
            start_url: start_url.into(),
            exclude_patterns: Vec::new(),
            max_pages: DEFAULT_MAX_PAGES,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referrer_mode: ReferrerMode::default(),
            deadline: None,
        }
    }

    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_referrer_mode(mut self, mode: ReferrerMode) -> Self {
        self.referrer_mode = mode;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_url.trim().is_empty() {
            return Err(ScanError::InvalidConfig("start_url is required".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ScanError::InvalidConfig("max_pages must be greater than 0".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ScanError::InvalidConfig("concurrency must be greater than 0".to_string()));
        }
        if self.request_timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "request timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
