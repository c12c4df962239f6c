//! End-to-end resolution tests with in-memory collaborators

use async_trait::async_trait;
use fitness_video_planner::config::PlanningConfig;
use fitness_video_planner::llm::{ChatMessage, LLMProvider, LLMResponse};
use fitness_video_planner::{
    is_valid, LivenessChecker, NormalizedQuery, PageFetcher, PlanAssembler, ProviderError,
    ProviderResult, ResolutionResult, Resolver, SearchProvider, LLM,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

enum SearchBehavior {
    Results(Vec<String>),
    Fail,
    Panic,
}

struct FakeSearch {
    behavior: SearchBehavior,
    calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl FakeSearch {
    fn new(behavior: SearchBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        })
    }

    fn returning(urls: &[&str]) -> Arc<Self> {
        Self::new(SearchBehavior::Results(urls.iter().map(|u| u.to_string()).collect()))
    }
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, query: &NormalizedQuery) -> ProviderResult<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.as_str().to_string());
        match &self.behavior {
            SearchBehavior::Results(urls) => Ok(urls.clone()),
            SearchBehavior::Fail => Err(ProviderError::decode("fake-search", "quota exceeded")),
            SearchBehavior::Panic => panic!("search backend blew up"),
        }
    }
}

/// Serves canned pages; unknown URLs fail like a network error
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
}

impl FakeFetcher {
    fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> ProviderResult<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::decode("fake-fetch", "connection refused"))
    }
}

#[derive(Default)]
struct FakeLiveness {
    dead: HashSet<String>,
    calls: AtomicUsize,
}

#[async_trait]
impl LivenessChecker for FakeLiveness {
    async fn lookup(&self, url: &str) -> ProviderResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.dead.contains(url) {
            Err(ProviderError::decode("fake-oembed", "404"))
        } else {
            Ok(())
        }
    }
}

struct FakeLLM {
    content: String,
    calls: AtomicUsize,
}

impl FakeLLM {
    fn answering(content: &str) -> Arc<Self> {
        Arc::new(Self {
            content: content.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LLM for FakeLLM {
    async fn chat(&self, _messages: Vec<ChatMessage>) -> ProviderResult<LLMResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(LLMResponse {
            content: self.content.clone(),
            tokens_used: None,
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

fn assembler() -> PlanAssembler {
    PlanAssembler::new(&PlanningConfig {
        max_days: 7,
        min_weekly_videos: 3,
        shuffle_seed: Some(42),
    })
}

fn resolver(
    search: Arc<FakeSearch>,
    fetcher: FakeFetcher,
    liveness: Arc<FakeLiveness>,
    llm: Arc<FakeLLM>,
) -> Resolver {
    Resolver::new(search, Arc::new(fetcher), Some(liveness), Some(llm), assembler())
}

fn weekly_entries(result: &ResolutionResult) -> &[fitness_video_planner::WeeklyPlanEntry] {
    match result {
        ResolutionResult::WeeklyPlan { plan } => plan,
        other => panic!("expected weeklyPlan, got {:?}", other),
    }
}

#[tokio::test]
async fn direct_links_answer_without_model() {
    let search = FakeSearch::returning(&[
        "https://www.youtube.com/watch?v=aaaaaaaaaaa",
        "https://youtu.be/bbbbbbbbbbb",
        "https://www.verywellfit.com/quick-workout",
    ]);
    let llm = FakeLLM::answering("[]");
    let resolver = resolver(search.clone(), FakeFetcher::default(), Arc::default(), llm.clone());

    let result = resolver.resolve("quick 10 min workout").await;

    assert_eq!(
        result,
        ResolutionResult::Videos {
            videos: vec![
                "https://www.youtube.com/watch?v=aaaaaaaaaaa".to_string(),
                "https://youtu.be/bbbbbbbbbbb".to_string(),
            ]
        }
    );
    assert_eq!(search.calls.load(Ordering::SeqCst), 1);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);

    let query = search.last_query.lock().unwrap().clone().unwrap();
    assert!(query.starts_with("quick 10 min workout "));
    assert!(query.contains("exercise"));
}

#[tokio::test]
async fn extracted_videos_follow_direct_links() {
    let search = FakeSearch::returning(&[
        "https://www.healthline.com/lower-back-stretches",
        "https://youtu.be/ccccccccccc",
    ]);
    let fetcher = FakeFetcher::default().with_page(
        "https://www.healthline.com/lower-back-stretches",
        r#"<html><head><meta property="og:video" content="https://vimeo.com/76979871"></head></html>"#,
    );
    let resolver = resolver(search, fetcher, Arc::default(), FakeLLM::answering("[]"));

    let result = resolver.resolve("lower back stretch").await;

    assert_eq!(
        result.video_urls(),
        vec!["https://youtu.be/ccccccccccc", "https://vimeo.com/76979871"]
    );
}

#[tokio::test]
async fn empty_discovery_uses_model_once_and_drops_fabricated_links() {
    let llm = FakeLLM::answering(
        r#"[
            {"name": "Cat cow", "description": "Spine mobility", "video": "https://www.youtube.com/watch?v=ddddddddddd"},
            {"name": "Made up", "description": "Not a video", "video": "https://example.com/sciatica"}
        ]"#,
    );
    let resolver = resolver(
        FakeSearch::returning(&[]),
        FakeFetcher::default(),
        Arc::default(),
        llm.clone(),
    );

    let result = resolver.resolve("sciatica relief").await;

    match &result {
        ResolutionResult::Plan { plan } => {
            assert_eq!(plan.len(), 1);
            assert_eq!(plan[0].name, "Cat cow");
        }
        other => panic!("expected plan, got {:?}", other),
    }
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_failure_degrades_to_fallback() {
    let llm = FakeLLM::answering(r#"[{"name": "Plank", "video": "https://vimeo.com/12345"}]"#);
    let resolver = resolver(
        FakeSearch::new(SearchBehavior::Fail),
        FakeFetcher::default(),
        Arc::default(),
        llm.clone(),
    );

    let result = resolver.resolve("core").await;

    assert!(!result.is_error());
    assert_eq!(result.video_urls(), vec!["https://vimeo.com/12345"]);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_model_yields_empty_plan() {
    let resolver = Resolver::new(
        FakeSearch::returning(&[]),
        Arc::new(FakeFetcher::default()),
        None,
        None,
        assembler(),
    );

    assert_eq!(resolver.resolve("yoga").await, ResolutionResult::Plan { plan: vec![] });
    assert_eq!(
        resolver.resolve_weekly("yoga").await,
        ResolutionResult::WeeklyPlan { plan: vec![] }
    );
}

#[tokio::test]
async fn empty_query_is_still_searched() {
    let search = FakeSearch::returning(&["https://youtu.be/eeeeeeeeeee"]);
    let resolver = resolver(search.clone(), FakeFetcher::default(), Arc::default(), FakeLLM::answering("[]"));

    let result = resolver.resolve("").await;

    assert_eq!(result.len(), 1);
    assert_eq!(
        search.last_query.lock().unwrap().as_deref(),
        Some("exercise workout video")
    );
}

#[tokio::test]
async fn panicking_provider_becomes_error_result() {
    let resolver = resolver(
        FakeSearch::new(SearchBehavior::Panic),
        FakeFetcher::default(),
        Arc::default(),
        FakeLLM::answering("[]"),
    );

    let result = resolver.resolve("anything").await;
    assert_eq!(result, ResolutionResult::error("search backend blew up"));

    let weekly = resolver.resolve_weekly("anything").await;
    assert!(weekly.is_error());
}

#[tokio::test]
async fn weekly_from_model_when_nothing_discovered() {
    let llm = FakeLLM::answering(r#"[{"day": "Day 1", "video": "https://vimeo.com/12345"}]"#);
    let resolver = resolver(
        FakeSearch::returning(&[]),
        FakeFetcher::default(),
        Arc::default(),
        llm.clone(),
    );

    let result = resolver.resolve_weekly("mobility").await;
    let plan = weekly_entries(&result);

    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].day, "Day 1");
    assert_eq!(plan[0].video, "https://vimeo.com/12345");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn weekly_plan_is_bounded_and_labeled() {
    let urls: Vec<String> = (0..10)
        .map(|i| format!("https://www.youtube.com/watch?v=video{:06}", i))
        .collect();
    let refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let llm = FakeLLM::answering("[]");
    let liveness = Arc::new(FakeLiveness::default());
    let resolver = resolver(
        FakeSearch::returning(&refs),
        FakeFetcher::default(),
        liveness.clone(),
        llm.clone(),
    );

    let result = resolver.resolve_weekly("full body").await;
    let plan = weekly_entries(&result);

    assert_eq!(plan.len(), 7);
    for (i, entry) in plan.iter().enumerate() {
        assert_eq!(entry.day, format!("Day {}", i + 1));
        assert!(is_valid(&entry.video));
        assert!(urls.contains(&entry.video));
    }
    let unique: HashSet<&str> = plan.iter().map(|e| e.video.as_str()).collect();
    assert_eq!(unique.len(), 7);

    assert_eq!(liveness.calls.load(Ordering::SeqCst), 10);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn weekly_drops_dead_youtube_links() {
    let dead = "https://www.youtube.com/watch?v=deaddeaddea";
    let liveness = Arc::new(FakeLiveness {
        dead: HashSet::from([dead.to_string()]),
        calls: AtomicUsize::new(0),
    });
    let resolver = resolver(
        FakeSearch::returning(&[
            "https://www.youtube.com/watch?v=alivealive1",
            dead,
            "https://youtu.be/alivealive2",
            "https://vimeo.com/55555",
        ]),
        FakeFetcher::default(),
        liveness.clone(),
        FakeLLM::answering("[]"),
    );

    let result = resolver.resolve_weekly("pilates").await;
    let plan = weekly_entries(&result);

    assert_eq!(plan.len(), 3);
    assert!(plan.iter().all(|e| e.video != dead));
    // Vimeo links skip the lookup
    assert_eq!(liveness.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn weekly_below_threshold_uses_model_result_alone() {
    let llm = FakeLLM::answering(
        r#"[
            {"day": "Day 1", "video": "https://vimeo.com/11111", "name": "Warm up"},
            {"day": "Day 2", "video": "https://vimeo.com/22222", "name": "Legs"},
            {"day": "Day 3", "video": "https://not-a-video.example.com/x", "name": "Fake"}
        ]"#,
    );
    let resolver = resolver(
        FakeSearch::returning(&["https://youtu.be/onlyoneonly"]),
        FakeFetcher::default(),
        Arc::default(),
        llm.clone(),
    );

    let result = resolver.resolve_weekly("beginner").await;
    let plan = weekly_entries(&result);

    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        plan.iter().map(|e| e.video.as_str()).collect::<Vec<_>>(),
        vec!["https://vimeo.com/11111", "https://vimeo.com/22222"]
    );
    assert_eq!(plan[1].day, "Day 2");
}

#[tokio::test]
async fn weekly_result_serializes_with_type_tag() {
    let resolver = resolver(
        FakeSearch::returning(&[]),
        FakeFetcher::default(),
        Arc::default(),
        FakeLLM::answering(r#"[{"day": "Day 1", "video": "https://vimeo.com/12345"}]"#),
    );

    let result = resolver.resolve_weekly("stretch").await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["type"], "weeklyPlan");
    assert_eq!(json["plan"][0]["video"], "https://vimeo.com/12345");
    assert!(json.get("videos").is_none());
}

#[tokio::test]
async fn weekly_keeps_discovered_videos_when_fallback_is_empty() {
    let search = FakeSearch::returning(&["https://vimeo.com/11111", "https://vimeo.com/22222"]);

    let without_model = Resolver::new(
        search.clone(),
        Arc::new(FakeFetcher::default()),
        None,
        None,
        assembler(),
    );
    let result = without_model.resolve_weekly("stretching").await;
    let plan = weekly_entries(&result);
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].day, "Day 1");
    assert_eq!(plan[1].day, "Day 2");

    let llm = FakeLLM::answering(r#"[{"day": "Day 1", "video": "https://example.com/made-up"}]"#);
    let with_useless_model = resolver(search, FakeFetcher::default(), Arc::default(), llm.clone());
    let result = with_useless_model.resolve_weekly("stretching").await;
    let mut videos = result.video_urls();
    videos.sort();
    assert_eq!(videos, vec!["https://vimeo.com/11111", "https://vimeo.com/22222"]);
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}
