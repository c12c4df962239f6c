/// Candidate discovery: structured search plus heuristic page scraping
///
/// Search results that already look like playable links are used as-is;
/// everything else goes through the [`PageVideoExtractor`], which fetches the
/// page and scans its markup for an embedded video.

pub mod search;
pub mod extractor;
pub mod cache;

pub use cache::{CachedSearchProvider, SearchCacheManager};
pub use extractor::{find_embedded_video, HttpPageFetcher, PageFetcher, PageVideoExtractor};
pub use search::HttpSearchProvider;

use crate::error::ProviderResult;
use crate::query::NormalizedQuery;
use crate::validation::is_valid;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where a candidate URL came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    Search,
    Extracted,
    Generated,
}

/// An unvalidated URL found during resolution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub provenance: Provenance,
}

impl Candidate {
    pub fn new(url: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            url: url.into(),
            provenance,
        }
    }

    /// Pattern check before the candidate may be handed on
    pub fn is_valid(&self) -> bool {
        let ok = is_valid(&self.url);
        if !ok {
            debug!("Dropping {:?} candidate with unrecognized link: {}", self.provenance, self.url);
        }
        ok
    }
}

/// External search API restricted to video-hosting domains
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Ordered result URLs for the query
    async fn search(&self, query: &NormalizedQuery) -> ProviderResult<Vec<String>>;
}

/// Result of one discovery pass
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOutcome {
    /// Search results that were already direct video links
    pub direct: Vec<Candidate>,
    /// Videos pulled out of non-direct result pages
    pub extracted: Vec<Candidate>,
}

impl DiscoveryOutcome {
    pub fn is_empty(&self) -> bool {
        self.direct.is_empty() && self.extracted.is_empty()
    }

    /// All candidate URLs, direct first, each group in search order
    pub fn urls(&self) -> Vec<String> {
        self.direct
            .iter()
            .chain(self.extracted.iter())
            .map(|c| c.url.clone())
            .collect()
    }
}
