/// Deduplication, shuffling and bounding of validated videos into plans
use super::{PlanEntry, WeeklyPlanEntry};
use crate::config::PlanningConfig;
use crate::validation::{classify, is_valid, VideoPlatform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use tracing::debug;

/// Uniform random permutation in place (Fisher-Yates)
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// `Day 1` for position 0
pub fn day_label(position: usize) -> String {
    format!("Day {}", position + 1)
}

/// Relabel entries `Day 1..Day k` by their current position
pub fn label_days(mut entries: Vec<WeeklyPlanEntry>) -> Vec<WeeklyPlanEntry> {
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.day = day_label(i);
    }
    entries
}

/// Drop repeated URLs, keeping the first occurrence and original order
pub fn dedupe_urls<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    urls.into_iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty() && seen.insert(u.clone()))
        .collect()
}

fn platform_name(url: &str) -> &'static str {
    match classify(url) {
        Some(VideoPlatform::YouTube) => "YouTube",
        Some(VideoPlatform::Vimeo) => "Vimeo",
        Some(VideoPlatform::TikTok) => "TikTok",
        Some(VideoPlatform::Dailymotion) => "Dailymotion",
        Some(VideoPlatform::Instagram) => "Instagram",
        Some(VideoPlatform::DirectFile) | None => "Video",
    }
}

/// Turns validated candidates into bounded plans
#[derive(Debug, Clone)]
pub struct PlanAssembler {
    max_days: usize,
    min_weekly_videos: usize,
    seed: Option<u64>,
}

impl PlanAssembler {
    pub fn new(config: &PlanningConfig) -> Self {
        Self {
            max_days: config.max_days.min(7),
            min_weekly_videos: config.min_weekly_videos,
            seed: config.shuffle_seed,
        }
    }

    pub fn max_days(&self) -> usize {
        self.max_days
    }

    /// Whether enough videos survived to skip the generative fallback
    pub fn is_confident(&self, validated: usize) -> bool {
        validated > 0 && validated >= self.min_weekly_videos
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Flat `videos` list: direct links first, then extracted ones, deduplicated
    pub fn assemble_videos(&self, direct: Vec<String>, extracted: Vec<String>) -> Vec<String> {
        dedupe_urls(direct.into_iter().chain(extracted))
    }

    /// Shuffle, bound and label discovered videos into a weekly plan
    pub fn assemble_weekly(&self, videos: Vec<String>, query: &str) -> Vec<WeeklyPlanEntry> {
        let mut videos: Vec<String> = dedupe_urls(videos)
            .into_iter()
            .filter(|u| is_valid(u))
            .collect();

        shuffle(&mut videos, &mut self.rng());
        videos.truncate(self.max_days);

        let topic = query.trim();
        let entries = videos
            .into_iter()
            .map(|video| {
                let platform = platform_name(&video);
                WeeklyPlanEntry {
                    day: String::new(),
                    name: format!("{} workout", platform),
                    description: if topic.is_empty() {
                        format!("Follow-along {} session", platform)
                    } else {
                        format!("Follow-along {} session for \"{}\"", platform, topic)
                    },
                    video,
                }
            })
            .collect();

        label_days(entries)
    }

    /// Bound and relabel generated weekly entries that already passed validation
    pub fn finalize_generated_weekly(&self, entries: Vec<WeeklyPlanEntry>) -> Vec<WeeklyPlanEntry> {
        let mut seen = HashSet::new();
        let mut entries: Vec<WeeklyPlanEntry> = entries
            .into_iter()
            .filter(|e| is_valid(&e.video) && seen.insert(e.video.clone()))
            .collect();
        entries.truncate(self.max_days);
        debug!("Generated weekly plan bounded to {} entries", entries.len());
        label_days(entries)
    }

    /// Deduplicate generated flat entries that already passed validation
    pub fn finalize_generated_plan(&self, entries: Vec<PlanEntry>) -> Vec<PlanEntry> {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .filter(|e| is_valid(&e.video) && seen.insert(e.video.clone()))
            .collect()
    }
}

impl Default for PlanAssembler {
    fn default() -> Self {
        Self::new(&PlanningConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn youtube_urls(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("https://www.youtube.com/watch?v=video{:06}", i))
            .collect()
    }

    fn seeded(seed: u64) -> PlanAssembler {
        PlanAssembler::new(&PlanningConfig {
            shuffle_seed: Some(seed),
            ..PlanningConfig::default()
        })
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut rng);

        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_is_reproducible_with_seed() {
        let mut a: Vec<u32> = (0..10).collect();
        let mut b = a.clone();
        shuffle(&mut a, &mut StdRng::seed_from_u64(3));
        shuffle(&mut b, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_handles_tiny_inputs() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut empty: Vec<u8> = vec![];
        shuffle(&mut empty, &mut rng);
        let mut one = vec![1];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![1]);
    }

    #[test]
    fn test_shuffle_reaches_every_position() {
        // With enough seeds, element 0 should land in every slot
        let mut positions = HashSet::new();
        for seed in 0..200 {
            let mut items = vec![0, 1, 2, 3];
            shuffle(&mut items, &mut StdRng::seed_from_u64(seed));
            positions.insert(items.iter().position(|&x| x == 0).unwrap());
        }
        assert_eq!(positions.len(), 4);
    }

    #[test]
    fn test_weekly_plan_is_bounded_and_labeled() {
        let plan = seeded(1).assemble_weekly(youtube_urls(12), "core");
        assert_eq!(plan.len(), 7);
        for (i, entry) in plan.iter().enumerate() {
            assert_eq!(entry.day, format!("Day {}", i + 1));
            assert!(is_valid(&entry.video));
        }
    }

    #[test]
    fn test_weekly_plan_drops_invalid_and_duplicates() {
        let mut urls = youtube_urls(2);
        urls.push(urls[0].clone());
        urls.push("https://example.com/blog/post".to_string());

        let plan = seeded(5).assemble_weekly(urls, "");
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_confidence_threshold() {
        let assembler = PlanAssembler::default();
        assert!(!assembler.is_confident(0));
        assert!(!assembler.is_confident(2));
        assert!(assembler.is_confident(3));

        let lenient = PlanAssembler::new(&PlanningConfig {
            min_weekly_videos: 0,
            ..PlanningConfig::default()
        });
        assert!(!lenient.is_confident(0));
        assert!(lenient.is_confident(1));
    }

    #[test]
    fn test_assemble_videos_preserves_order() {
        let videos = PlanAssembler::default().assemble_videos(
            vec!["https://youtu.be/a1".to_string(), "https://youtu.be/b2".to_string()],
            vec!["https://cdn.example.com/c.mp4".to_string(), "https://youtu.be/a1".to_string()],
        );
        assert_eq!(
            videos,
            vec![
                "https://youtu.be/a1".to_string(),
                "https://youtu.be/b2".to_string(),
                "https://cdn.example.com/c.mp4".to_string(),
            ]
        );
    }

    #[test]
    fn test_generated_weekly_is_relabelled() {
        let entries = vec![
            WeeklyPlanEntry {
                day: "Monday".to_string(),
                video: "https://vimeo.com/12345".to_string(),
                name: "Hips".to_string(),
                description: String::new(),
            },
            WeeklyPlanEntry {
                day: "Tuesday".to_string(),
                video: "https://example.com/not-a-video".to_string(),
                name: "Fake".to_string(),
                description: String::new(),
            },
        ];

        let plan = PlanAssembler::default().finalize_generated_weekly(entries);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].day, "Day 1");
    }
}
