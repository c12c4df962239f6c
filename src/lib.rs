/// Fitness Video Planner
///
/// Resolves a free-text fitness query into playable exercise videos, either as
/// a flat list or as a day-by-day weekly plan. Discovery combines a structured
/// search API with page scraping; a generative model fills in when discovery
/// comes up short.

pub mod config;
pub mod error;
pub mod query;
pub mod discovery;
pub mod validation;
pub mod llm;
pub mod plan;
pub mod resolver;

#[cfg(feature = "api")]
pub mod api;

// Re-export main types for easy access
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{ProviderError, ProviderResult};
pub use crate::query::{normalize, NormalizedQuery};
pub use crate::discovery::{Candidate, PageFetcher, Provenance, SearchProvider};
pub use crate::validation::{is_direct, is_valid, LivenessChecker, VideoPlatform};
pub use crate::llm::{LLMConfig, LLMProvider, LLM};
pub use crate::plan::{PlanAssembler, PlanEntry, ResolutionResult, WeeklyPlanEntry};
pub use crate::resolver::Resolver;
