//! Resolution orchestrator
//!
//! Sequences normalization, discovery, validation, fallback and assembly for
//! the two entry points. Every external call gets exactly one attempt and a
//! failing call only shrinks the candidate set. Nothing escapes
//! [`Resolver::resolve`] or [`Resolver::resolve_weekly`]: a panic anywhere in
//! the pipeline becomes [`ResolutionResult::Error`].

use crate::config::Config;
use crate::discovery::{
    CachedSearchProvider, Candidate, DiscoveryOutcome, HttpPageFetcher, HttpSearchProvider,
    PageFetcher, PageVideoExtractor, Provenance, SearchCacheManager, SearchProvider,
};
use crate::llm::{create_llm, GenerativeFallback, LLM};
use crate::plan::{dedupe_urls, PlanAssembler, ResolutionResult};
use crate::query::{normalize, NormalizedQuery};
use crate::validation::{is_direct, is_playable, is_valid, LivenessChecker, OEmbedLivenessChecker};
use anyhow::Result;
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Top-level entry points for single and weekly plan resolution
#[derive(Clone)]
pub struct Resolver {
    search: Arc<dyn SearchProvider>,
    extractor: PageVideoExtractor,
    liveness: Option<Arc<dyn LivenessChecker>>,
    fallback: Option<GenerativeFallback>,
    assembler: PlanAssembler,
}

impl Resolver {
    /// Build a resolver from injected collaborators.
    ///
    /// `liveness: None` skips liveness checks; `llm: None` makes the
    /// generative fallback return nothing.
    pub fn new(
        search: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        liveness: Option<Arc<dyn LivenessChecker>>,
        llm: Option<Arc<dyn LLM>>,
        assembler: PlanAssembler,
    ) -> Self {
        Self {
            search,
            extractor: PageVideoExtractor::new(fetcher),
            liveness,
            fallback: llm.map(GenerativeFallback::new),
            assembler,
        }
    }

    /// Wire up HTTP-backed collaborators from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut search: Arc<dyn SearchProvider> =
            Arc::new(HttpSearchProvider::new(config.search.clone()));

        if config.cache.enabled {
            std::fs::create_dir_all(&config.cache.cache_dir)?;
            let cache = SearchCacheManager::new(config.cache.cache_dir.clone(), config.cache.ttl_hours);
            search = Arc::new(CachedSearchProvider::new(search, cache));
        }

        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpPageFetcher::new(&config.extraction));

        let liveness: Option<Arc<dyn LivenessChecker>> = if config.liveness.enabled {
            Some(Arc::new(OEmbedLivenessChecker::new(&config.liveness)))
        } else {
            None
        };

        let llm: Option<Arc<dyn LLM>> = match create_llm(&config.llm) {
            Ok(llm) => Some(Arc::from(llm)),
            Err(e) => {
                warn!("Generative fallback disabled: {}", e);
                None
            }
        };

        Ok(Self::new(
            search,
            fetcher,
            liveness,
            llm,
            PlanAssembler::new(&config.planning),
        ))
    }

    /// Resolve a query into a flat list of videos, or a generated plan when
    /// discovery finds nothing.
    pub async fn resolve(&self, query: &str) -> ResolutionResult {
        guard("resolve", self.resolve_inner(query)).await
    }

    /// Resolve a query into a day-labeled plan of at most seven videos
    pub async fn resolve_weekly(&self, query: &str) -> ResolutionResult {
        guard("resolve_weekly", self.resolve_weekly_inner(query)).await
    }

    /// Whether a generative fallback is configured and reachable
    pub async fn fallback_available(&self) -> bool {
        match &self.fallback {
            Some(fallback) => fallback.is_available().await,
            None => false,
        }
    }

    async fn resolve_inner(&self, query: &str) -> ResolutionResult {
        let normalized = normalize(query);
        info!("🎯 Resolving \"{}\"", normalized);

        let outcome = self.discover(&normalized).await;

        if !outcome.is_empty() {
            let DiscoveryOutcome { direct, extracted, .. } = outcome;
            let videos = self.assembler.assemble_videos(
                direct.into_iter().map(|c| c.url).collect(),
                extracted.into_iter().map(|c| c.url).collect(),
            );
            info!("✅ Discovery answered with {} videos", videos.len());
            return ResolutionResult::Videos { videos };
        }

        info!("⚠️ Discovery found nothing, using generative fallback");
        let plan = match &self.fallback {
            Some(fallback) => {
                let entries = fallback.generate_plan(prompt_topic(query, &normalized)).await;
                self.assembler.finalize_generated_plan(entries)
            }
            None => Vec::new(),
        };

        ResolutionResult::Plan { plan }
    }

    async fn resolve_weekly_inner(&self, query: &str) -> ResolutionResult {
        let normalized = normalize(query);
        info!("📅 Resolving weekly plan for \"{}\"", normalized);

        let outcome = self.discover(&normalized).await;
        let candidates: Vec<String> = dedupe_urls(outcome.urls())
            .into_iter()
            .filter(|url| is_valid(url))
            .collect();

        let live = self.confirm_live(candidates).await;
        let plan = self.assembler.assemble_weekly(live, query);

        if self.assembler.is_confident(plan.len()) {
            info!("✅ Weekly plan built from {} discovered videos", plan.len());
            return ResolutionResult::WeeklyPlan { plan };
        }

        info!(
            "⚠️ Only {} playable videos discovered, using generative fallback",
            plan.len()
        );
        let generated = match &self.fallback {
            Some(fallback) => {
                let entries = fallback
                    .generate_weekly(prompt_topic(query, &normalized), self.assembler.max_days())
                    .await;
                self.assembler.finalize_generated_weekly(entries)
            }
            None => Vec::new(),
        };

        if generated.is_empty() && !plan.is_empty() {
            info!("⚠️ Fallback produced nothing, keeping {} discovered videos", plan.len());
            return ResolutionResult::WeeklyPlan { plan };
        }

        ResolutionResult::WeeklyPlan { plan: generated }
    }

    /// Search, then extract embedded videos from non-direct result pages
    async fn discover(&self, query: &NormalizedQuery) -> DiscoveryOutcome {
        let urls = match self.search.search(query).await {
            Ok(urls) => dedupe_urls(urls),
            Err(e) => {
                warn!("Search unavailable, continuing without results: {}", e);
                Vec::new()
            }
        };

        let (direct, needs_extraction): (Vec<String>, Vec<String>) =
            urls.into_iter().partition(|url| is_direct(url));

        debug!(
            "{} direct results, {} pages to scan",
            direct.len(),
            needs_extraction.len()
        );

        let extracted_results = self.extractor.extract_all(&needs_extraction).await;
        let unresolved = extracted_results.iter().filter(|r| r.is_none()).count();
        if unresolved > 0 {
            debug!("{} result pages had no usable video", unresolved);
        }

        let extracted = extracted_results
            .into_iter()
            .flatten()
            .map(|url| Candidate::new(url, Provenance::Extracted))
            .filter(Candidate::is_valid)
            .collect();

        DiscoveryOutcome {
            direct: direct
                .into_iter()
                .map(|url| Candidate::new(url, Provenance::Search))
                .collect(),
            extracted,
        }
    }

    /// Keep only candidates that pass the liveness check, preserving order
    async fn confirm_live(&self, candidates: Vec<String>) -> Vec<String> {
        let Some(checker) = &self.liveness else {
            return candidates;
        };

        let checks = join_all(candidates.iter().map(|url| is_playable(checker.as_ref(), url))).await;
        let before = candidates.len();
        let live: Vec<String> = candidates
            .into_iter()
            .zip(checks)
            .filter_map(|(url, playable)| playable.then_some(url))
            .collect();

        debug!("Liveness: {} of {} candidates playable", live.len(), before);
        live
    }
}

/// Topic sent to the model: the user's own words when present
fn prompt_topic<'a>(raw: &'a str, normalized: &'a NormalizedQuery) -> &'a str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        normalized.as_str()
    } else {
        trimmed
    }
}

/// Run a pipeline body, turning a panic into an `error` result
async fn guard<F>(operation: &str, body: F) -> ResolutionResult
where
    F: Future<Output = ResolutionResult>,
{
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("❌ {} failed: {}", operation, message);
            ResolutionResult::error(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error during resolution".to_string()
    }
}
