//! Crawl state owned by the orchestrator: the FIFO frontier, the visited
//! set, and the inbound link index used to fill in referrers.

use crate::normalize::CrawlTarget;
use crate::result::MAX_REFERRERS;
use std::collections::{HashMap, HashSet, VecDeque};

/// Pages waiting for a visit plus every page already dequeued.
///
/// A target is in the queue at most once and never re-enters it after it has
/// been visited. The visited set only grows.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<CrawlTarget>,
    queued: HashSet<CrawlTarget>,
    visited: HashSet<CrawlTarget>,
    visit_order: Vec<CrawlTarget>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `target` unless it is already queued or visited. Returns whether it was accepted.
    pub fn enqueue_if_new(&mut self, target: CrawlTarget) -> bool {
        if self.visited.contains(&target) || self.queued.contains(&target) {
            return false;
        }
        self.queued.insert(target.clone());
        self.queue.push_back(target);
        true
    }

    /// Remove up to `max_size` targets from the front, marking each visited
    /// before it is returned.
    pub fn dequeue_batch(&mut self, max_size: usize) -> Vec<CrawlTarget> {
        let mut batch = Vec::with_capacity(max_size.min(self.queue.len()));

        while batch.len() < max_size {
            let Some(target) = self.queue.pop_front() else {
                break;
            };
            self.queued.remove(&target);

            if self.mark_visited(target.clone()) {
                batch.push(target);
            }
        }

        batch
    }

    /// Returns false if the target had already been visited.
    fn mark_visited(&mut self, target: CrawlTarget) -> bool {
        if !self.visited.insert(target.clone()) {
            return false;
        }
        self.visit_order.push(target);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Visited pages in the order they were dequeued.
    pub fn visited(&self) -> &[CrawlTarget] {
        &self.visit_order
    }

    pub fn into_visited(self) -> Vec<CrawlTarget> {
        self.visit_order
    }
}

/// Maps each discovered target to the pages that linked to it, in discovery order.
#[derive(Debug, Default)]
pub struct ReferrerIndex {
    inbound: HashMap<CrawlTarget, Vec<CrawlTarget>>,
}

impl ReferrerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `MAX_REFERRERS` pages per target, the first ones seen.
    pub fn record(&mut self, link: &CrawlTarget, page: &CrawlTarget) {
        let referrers = self.inbound.entry(link.clone()).or_default();
        if referrers.len() < MAX_REFERRERS && !referrers.contains(page) {
            referrers.push(page.clone());
        }
    }

    pub fn referrers_of(&self, target: &CrawlTarget) -> &[CrawlTarget] {
        self.inbound.get(target).map(Vec::as_slice).unwrap_or(&[])
    }
}
