use crate::config::{CrawlConfig, ReferrerMode};
use crate::error::Result;
use crate::fetcher::PageFetcher;
use crate::frontier::{Frontier, ReferrerIndex};
use crate::normalize::{CrawlTarget, UrlFilter};
use crate::result::{BrokenLinkRecord, CrawlSummary, FetchOutcome, MAX_REFERRERS, StopReason};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Crawl state reported after every batch has been folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    pub batch: usize,
    pub batch_size: usize,
    pub visited: usize,
    pub queued: usize,
    pub broken: usize,
}

pub type ProgressCallback = Arc<dyn Fn(&BatchProgress) + Send + Sync>;
pub type ResultCallback = Arc<dyn Fn(&BrokenLinkRecord) + Send + Sync>;

/// Drives the batch loop.
///
/// Each batch is fetched in parallel on spawned tasks, then joined. Frontier,
/// visited set, referrers and broken links are only touched here, after the
/// join, so the workers never share mutable state.
pub struct Crawler {
    config: CrawlConfig,
    fetcher: PageFetcher,
    progress_callback: Option<ProgressCallback>,
    result_callback: Option<ResultCallback>,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = PageFetcher::new(config.request_timeout, &config.user_agent)?;

        Ok(Self {
            config,
            fetcher,
            progress_callback: None,
            result_callback: None,
        })
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn with_result_callback(mut self, callback: ResultCallback) -> Self {
        self.result_callback = Some(callback);
        self
    }

    /// Crawl and return only the broken links, in discovery order.
    pub async fn crawl(&self) -> Result<Vec<BrokenLinkRecord>> {
        Ok(self.run().await?.broken_links)
    }

    /// Crawl and return the full summary.
    ///
    /// Only an unusable seed URL is an error. Everything that goes wrong with
    /// individual pages ends up in `broken_links`.
    pub async fn run(&self) -> Result<CrawlSummary> {
        let seed = CrawlTarget::parse(&self.config.start_url)?;
        let filter = UrlFilter::new(&seed, &self.config.exclude_patterns);

        info!(
            "Starting crawl of {} with {} workers (max {} pages)",
            seed, self.config.concurrency, self.config.max_pages
        );

        let started = Instant::now();
        let mut frontier = Frontier::new();
        let mut referrers = ReferrerIndex::new();
        let mut broken_links = Vec::new();
        let mut batches = 0;

        frontier.enqueue_if_new(seed);

        let stop_reason = loop {
            if frontier.is_empty() {
                break StopReason::FrontierExhausted;
            }
            if frontier.visited_len() >= self.config.max_pages {
                break StopReason::BudgetReached;
            }
            if self.config.deadline.is_some_and(|d| started.elapsed() >= d) {
                break StopReason::DeadlineReached;
            }

            let batch = frontier.dequeue_batch(self.config.concurrency);
            if batch.is_empty() {
                break StopReason::FrontierExhausted;
            }
            batches += 1;

            info!(
                "Crawling batch of {} URLs. Total visited: {}",
                batch.len(),
                frontier.visited_len()
            );

            let batch_size = batch.len();
            let outcomes = self.fetch_batch(&batch).await;

            for (target, outcome) in batch.into_iter().zip(outcomes) {
                if outcome.is_failure() {
                    let referred_from = self.referrers_for(&target, &frontier, &referrers);
                    let record = BrokenLinkRecord::new(target, outcome.status(), referred_from);

                    if let Some(ref callback) = self.result_callback {
                        callback(&record);
                    }
                    broken_links.push(record);
                    continue;
                }

                for link in outcome.into_links() {
                    if let Some(reason) = filter.rejection(&link) {
                        debug!("Skipping {} ({})", link, reason);
                        continue;
                    }

                    referrers.record(&link, &target);
                    debug!("Discovered {} on {}", link, target);
                    frontier.enqueue_if_new(link);
                }
            }

            if let Some(ref callback) = self.progress_callback {
                callback(&BatchProgress {
                    batch: batches,
                    batch_size,
                    visited: frontier.visited_len(),
                    queued: frontier.queued_len(),
                    broken: broken_links.len(),
                });
            }
        };

        info!(
            "Crawl completed ({}). Visited {} URLs, found {} broken links.",
            stop_reason,
            frontier.visited_len(),
            broken_links.len()
        );

        Ok(CrawlSummary {
            broken_links,
            visited: frontier.into_visited(),
            batches,
            stop_reason,
            elapsed: started.elapsed(),
        })
    }

    /// Fetch every target on its own task and wait for all of them.
    ///
    /// Outcomes come back in batch order. A task that panics counts as a
    /// connection failure for its target only.
    async fn fetch_batch(&self, batch: &[CrawlTarget]) -> Vec<FetchOutcome> {
        let handles: Vec<_> = batch
            .iter()
            .cloned()
            .map(|target| {
                let fetcher = self.fetcher.clone();
                tokio::spawn(async move { fetcher.fetch(&target).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(batch)
            .map(|(joined, target)| match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Fetch task for {} failed: {}", target, e);
                    FetchOutcome::connection_failed(format!("fetch task failed: {}", e))
                }
            })
            .collect()
    }

    fn referrers_for(
        &self,
        target: &CrawlTarget,
        frontier: &Frontier,
        referrers: &ReferrerIndex,
    ) -> Vec<CrawlTarget> {
        match self.config.referrer_mode {
            ReferrerMode::Inbound => referrers
                .referrers_of(target)
                .iter()
                .take(MAX_REFERRERS)
                .cloned()
                .collect(),
            ReferrerMode::VisitedSnapshot => frontier
                .visited()
                .iter()
                .filter(|page| *page != target)
                .take(MAX_REFERRERS)
                .cloned()
                .collect(),
        }
    }
}
