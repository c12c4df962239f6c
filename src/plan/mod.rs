/// Plan types and the result contract returned to callers
///
/// [`ResolutionResult`] serializes as a `type`-tagged object; only the field
/// belonging to the tagged variant is present.

pub mod assembler;

pub use assembler::{day_label, dedupe_urls, label_days, shuffle, PlanAssembler};

use serde::{Deserialize, Serialize};

/// Entry of a single (non-weekly) plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub video: String,
}

/// Day-labeled entry of a weekly plan
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyPlanEntry {
    #[serde(default)]
    pub day: String,
    pub video: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Outcome of one resolution call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResolutionResult {
    /// Discovery answered the query directly
    Videos { videos: Vec<String> },
    /// Flat plan from the generative fallback
    Plan { plan: Vec<PlanEntry> },
    /// Day-labeled plan, at most seven entries
    WeeklyPlan { plan: Vec<WeeklyPlanEntry> },
    /// The pipeline itself malfunctioned
    Error { error: String },
}

impl ResolutionResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { error: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Number of videos or plan entries carried
    pub fn len(&self) -> usize {
        match self {
            Self::Videos { videos } => videos.len(),
            Self::Plan { plan } => plan.len(),
            Self::WeeklyPlan { plan } => plan.len(),
            Self::Error { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every video URL carried, in order
    pub fn video_urls(&self) -> Vec<&str> {
        match self {
            Self::Videos { videos } => videos.iter().map(String::as_str).collect(),
            Self::Plan { plan } => plan.iter().map(|e| e.video.as_str()).collect(),
            Self::WeeklyPlan { plan } => plan.iter().map(|e| e.video.as_str()).collect(),
            Self::Error { .. } => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_wire_shapes() {
        let videos = ResolutionResult::Videos {
            videos: vec!["https://youtu.be/abc123".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&videos).unwrap(),
            json!({"type": "videos", "videos": ["https://youtu.be/abc123"]})
        );

        let weekly = ResolutionResult::WeeklyPlan {
            plan: vec![WeeklyPlanEntry {
                day: "Day 1".to_string(),
                video: "https://vimeo.com/12345".to_string(),
                name: "Mobility".to_string(),
                description: "Hips".to_string(),
            }],
        };
        let value = serde_json::to_value(&weekly).unwrap();
        assert_eq!(value["type"], "weeklyPlan");
        assert_eq!(value["plan"][0]["day"], "Day 1");

        let error = ResolutionResult::error("boom");
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"type": "error", "error": "boom"})
        );
    }

    #[test]
    fn test_plan_variant_has_no_videos_field() {
        let plan = ResolutionResult::Plan { plan: vec![] };
        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["type"], "plan");
        assert!(value.get("videos").is_none());
        assert!(plan.is_empty());
    }
}
