//! URL normalization and crawl eligibility.
//!
//! Every URL the engine handles is a [`CrawlTarget`]: an absolute http(s) URL
//! reduced to `scheme://host[:port]/path[?query]`. Fragments, credentials,
//! default ports and empty queries are removed, so two links that point at the
//! same page compare equal.

use crate::error::{Result, ScanError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// Path suffixes that are never fetched because they cannot contain links.
pub const SKIPPED_EXTENSIONS: [&str; 8] = [
    ".jpg", ".jpeg", ".png", ".gif", ".pdf", ".zip", ".doc", ".docx",
];

/// A normalized URL, the unit of crawl work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlTarget(Url);

impl CrawlTarget {
    /// Parse an absolute URL (typically the seed) into its normalized form.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw, e)))?;

        Self::from_url(url).ok_or_else(|| {
            ScanError::InvalidUrl(format!("{}: only http(s) URLs with a host can be crawled", raw))
        })
    }

    fn from_url(mut url: Url) -> Option<Self> {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return None;
        }

        url.set_fragment(None);
        // Both only fail for URLs without a host, which were rejected above.
        let _ = url.set_username("");
        let _ = url.set_password(None);
        if url.query() == Some("") {
            url.set_query(None);
        }

        Some(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CrawlTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CrawlTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        CrawlTarget::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Resolve `raw_link` against the page it was found on and normalize it.
///
/// Returns `None` for links that cannot be crawled (non-http schemes,
/// unparseable hrefs) and for links that point back at `page` itself, such as
/// `#section` anchors.
pub fn normalize(raw_link: &str, page: &CrawlTarget) -> Option<CrawlTarget> {
    let resolved = page.as_url().join(raw_link).ok()?;
    let target = CrawlTarget::from_url(resolved)?;

    if target == *page {
        return None;
    }

    Some(target)
}

/// Why a target was refused by [`UrlFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    OffDomain,
    Excluded(String),
    NonHtmlResource,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::OffDomain => write!(f, "different host"),
            Rejection::Excluded(pattern) => write!(f, "matches exclude pattern '{}'", pattern),
            Rejection::NonHtmlResource => write!(f, "non-HTML resource"),
        }
    }
}

/// Decides whether a discovered target may enter the frontier.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    host: String,
    port: Option<u16>,
    exclude_patterns: Vec<String>,
}

impl UrlFilter {
    /// Empty patterns are ignored, they would otherwise exclude every URL.
    pub fn new(seed: &CrawlTarget, exclude_patterns: &[String]) -> Self {
        Self {
            host: seed.host().unwrap_or_default().to_string(),
            port: seed.as_url().port(),
            exclude_patterns: exclude_patterns
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
        }
    }

    pub fn rejection(&self, target: &CrawlTarget) -> Option<Rejection> {
        if target.host() != Some(self.host.as_str()) || target.as_url().port() != self.port {
            return Some(Rejection::OffDomain);
        }

        // Plain substring containment, not glob or regex
        if let Some(pattern) = self
            .exclude_patterns
            .iter()
            .find(|p| target.as_str().contains(p.as_str()))
        {
            return Some(Rejection::Excluded(pattern.clone()));
        }

        let path = target.path().to_lowercase();
        if SKIPPED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return Some(Rejection::NonHtmlResource);
        }

        None
    }
}
