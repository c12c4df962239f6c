/// Heuristic extraction of embedded video URLs from result pages
use crate::config::ExtractionConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::validation::{classify, is_valid, VideoPlatform};
use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const PROVIDER: &str = "page";

/// Whole URL tokens as they appear in markup
static URL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)https?://[^\s"'<>()\\]+"#).expect("valid regex"));

/// Canonical watch URL; the id must not continue past 11 characters
static YOUTUBE_WATCH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(https?://(?:www\.|m\.)?youtube\.com/watch\?v=[\w-]{11})(?:[^\w-]|$)")
        .expect("valid regex")
});

/// Meta tags that may point straight at a player or stream
const VIDEO_META_SELECTORS: [&str; 4] = [
    r#"meta[property="og:video:secure_url"]"#,
    r#"meta[property="og:video:url"]"#,
    r#"meta[property="og:video"]"#,
    r#"meta[name="twitter:player:stream"]"#,
];

/// Fetches raw page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ProviderResult<String>;
}

/// reqwest-backed page fetcher with a bounded per-request timeout
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(config: &ExtractionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> ProviderResult<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::status(PROVIDER, response.status()));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))
    }
}

/// Scan markup for the first embedded video.
///
/// Preference: `.mp4`/`.webm` file URL, then canonical YouTube watch URL,
/// then a video meta tag whose value is a recognized video link. Only URLs
/// literally present in the markup are returned.
pub fn find_embedded_video(html: &str) -> Option<String> {
    let video_file = URL_TOKEN
        .find_iter(html)
        .map(|m| m.as_str())
        .find(|token| classify(token) == Some(VideoPlatform::DirectFile));
    if let Some(url) = video_file {
        return Some(url.to_string());
    }

    if let Some(id_match) = YOUTUBE_WATCH_URL.captures(html).and_then(|c| c.get(1)) {
        return Some(id_match.as_str().to_string());
    }

    find_meta_video(html)
}

fn find_meta_video(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for selector_str in VIDEO_META_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        let found = document
            .select(&selector)
            .filter_map(|el| el.value().attr("content"))
            .map(str::trim)
            .find(|content| content.starts_with("http") && is_valid(content));

        if let Some(content) = found {
            return Some(content.to_string());
        }
    }

    None
}

/// Extracts embedded videos from candidate pages
#[derive(Clone)]
pub struct PageVideoExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl PageVideoExtractor {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch one page and look for a video; failures yield `None`
    pub async fn extract(&self, url: &str) -> Option<String> {
        match self.fetcher.fetch(url).await {
            Ok(html) => {
                let found = find_embedded_video(&html);
                match &found {
                    Some(video) => debug!("Extracted {} from {}", video, url),
                    None => debug!("No embedded video in {}", url),
                }
                found
            }
            Err(e) => {
                debug!("Page fetch failed for {}: {}", url, e);
                None
            }
        }
    }

    /// Extract from every page concurrently; output order matches input
    pub async fn extract_all(&self, urls: &[String]) -> Vec<Option<String>> {
        if urls.is_empty() {
            return Vec::new();
        }

        info!("🌐 Extracting embedded videos from {} pages", urls.len());
        join_all(urls.iter().map(|url| self.extract(url))).await
    }
}
