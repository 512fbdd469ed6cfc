pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod frontier;
pub mod normalize;
pub mod result;

pub use config::{CrawlConfig, ReferrerMode};
pub use crawler::{BatchProgress, Crawler, ProgressCallback, ResultCallback};
pub use error::ScanError;
pub use fetcher::PageFetcher;
pub use normalize::{CrawlTarget, UrlFilter, normalize};
pub use result::{BrokenLinkRecord, CrawlSummary, FetchOutcome, StopReason};
