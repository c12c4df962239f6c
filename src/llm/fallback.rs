//! Generative fallback used when discovery finds too few videos.
//!
//! The model is asked for a strict JSON array. Its output is never trusted:
//! fences are stripped, parse failures mean "no results", and every entry must
//! pass [`is_valid`](crate::validation::is_valid) before it is returned.

use super::{ChatMessage, LLM};
use crate::plan::{PlanEntry, WeeklyPlanEntry};
use crate::discovery::{Candidate, Provenance};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are a fitness coach who recommends real, publicly available exercise videos. \
Respond with a JSON array only: no prose, no Markdown, no comments.";

/// Asks a generative model for candidate videos
#[derive(Clone)]
pub struct GenerativeFallback {
    llm: Arc<dyn LLM>,
}

impl GenerativeFallback {
    pub fn new(llm: Arc<dyn LLM>) -> Self {
        Self { llm }
    }

    /// Whether the backing model answers at all
    pub async fn is_available(&self) -> bool {
        self.llm.is_available().await
    }

    /// Flat `{name, description, video}` entries for a query
    pub async fn generate_plan(&self, query: &str) -> Vec<PlanEntry> {
        info!("🤖 Asking {:?} for a fallback plan", self.llm.provider_type());

        let entries: Vec<PlanEntry> = self.ask(plan_prompt(query)).await;
        let total = entries.len();
        let accepted: Vec<PlanEntry> = entries.into_iter().filter(|e| accept(&e.video)).collect();

        info!("🤖 Fallback plan: {} of {} entries accepted", accepted.len(), total);
        accepted
    }

    /// Day-labeled `{day, video, name, description}` entries for a query
    pub async fn generate_weekly(&self, query: &str, days: usize) -> Vec<WeeklyPlanEntry> {
        info!("🤖 Asking {:?} for a fallback {}-day plan", self.llm.provider_type(), days);

        let entries: Vec<WeeklyPlanEntry> = self.ask(weekly_prompt(query, days)).await;
        let total = entries.len();
        let accepted: Vec<WeeklyPlanEntry> = entries.into_iter().filter(|e| accept(&e.video)).collect();

        info!("🤖 Fallback weekly plan: {} of {} entries accepted", accepted.len(), total);
        accepted
    }

    async fn ask<T: DeserializeOwned>(&self, prompt: String) -> Vec<T> {
        let messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        match self.llm.chat(messages).await {
            Ok(response) => {
                debug!("LLM response received ({:?} tokens)", response.tokens_used);
                parse_entries(&response.content)
            }
            Err(e) => {
                warn!("Generative fallback failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn accept(video: &str) -> bool {
    Candidate::new(video, Provenance::Generated).is_valid()
}

fn plan_prompt(query: &str) -> String {
    format!(
        r#"Recommend exercise videos for: "{query}"

Return a JSON array of objects with exactly these fields:
[{{"name": "short title", "description": "one sentence", "video": "https://..."}}]

Rules:
1. "video" must be a direct link to an existing video on YouTube (watch, shorts or youtu.be), Vimeo, TikTok, Dailymotion or Instagram reels, or a direct .mp4/.webm file.
2. Never invent, guess or shorten a link. If you are not sure a video exists, leave it out.
3. Never link to channels, playlists, search pages, articles or home pages.
4. Return [] if you cannot name any real video."#
    )
}

fn weekly_prompt(query: &str, days: usize) -> String {
    format!(
        r#"Build a {days}-day exercise plan for: "{query}"

Return a JSON array of exactly {days} objects with these fields:
[{{"day": "Day 1", "video": "https://...", "name": "short title", "description": "one sentence"}}]

Rules:
1. Days are labelled "Day 1" through "Day {days}" in order.
2. "video" must be a direct link to an existing video on YouTube (watch, shorts or youtu.be), Vimeo, TikTok, Dailymotion or Instagram reels, or a direct .mp4/.webm file.
3. Never invent, guess or shorten a link. If you are not sure a video exists, leave that day out.
4. Never link to channels, playlists, search pages, articles or home pages."#
    )
}

/// Strip Markdown code fences and surrounding whitespace
pub fn clean_llm_response(content: &str) -> String {
    let content = content.trim();

    if content.starts_with("```") {
        if let Some(start) = content.find('\n') {
            if let Some(end) = content.rfind("```") {
                if end > start {
                    return content[start + 1..end].trim().to_string();
                }
            }
        }
    }

    content.replace("```", "").trim().to_string()
}

/// Parse a JSON array of entries; anything unparseable yields no entries.
///
/// If the model wrapped the array in prose, the outermost `[...]` is tried.
/// Array elements of the wrong shape are skipped individually.
pub fn parse_entries<T: DeserializeOwned>(content: &str) -> Vec<T> {
    let cleaned = clean_llm_response(content);

    let values = serde_json::from_str::<Vec<Value>>(&cleaned).ok().or_else(|| {
        let start = cleaned.find('[')?;
        let end = cleaned.rfind(']')?;
        if end <= start {
            return None;
        }
        serde_json::from_str::<Vec<Value>>(&cleaned[start..=end]).ok()
    });

    let Some(values) = values else {
        warn!("Generative fallback returned invalid JSON; treating as empty");
        return Vec::new();
    };

    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping malformed generated entry: {}", e);
                None
            }
        })
        .collect()
}
