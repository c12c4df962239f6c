/// Query normalization for fitness video search
use serde::{Deserialize, Serialize};
use std::fmt;

/// Keywords that mark a query as already fitness-related
pub const FITNESS_KEYWORDS: [&str; 6] = [
    "exercise", "workout", "fitness", "stretch", "rehab", "training",
];

/// Appended when the query carries no fitness context
pub const GENERIC_SUFFIX: &str = "exercise workout video";

/// Appended when the query already mentions a fitness keyword
pub const FITNESS_SUFFIX: &str = "workout exercise fitness training stretch video";

/// A search query rewritten toward fitness video content.
///
/// Always non-empty and lowercase. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Rewrite a raw user query into a fitness-biased search query
pub fn normalize(raw: &str) -> NormalizedQuery {
    let base = raw.trim().to_lowercase();

    let suffix = if has_fitness_context(&base) {
        FITNESS_SUFFIX
    } else {
        GENERIC_SUFFIX
    };

    if base.is_empty() {
        return NormalizedQuery(suffix.to_string());
    }

    NormalizedQuery(format!("{} {}", base, suffix))
}

/// Case-insensitive substring test against [`FITNESS_KEYWORDS`]
pub fn has_fitness_context(query: &str) -> bool {
    let lowered = query.to_lowercase();
    FITNESS_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
