/// Link validation for discovered video candidates
///
/// Pattern checks here are pure string matches and never touch the network.
/// Liveness confirmation lives in [`liveness`].

pub mod liveness;

pub use liveness::{is_playable, LivenessChecker, OEmbedLivenessChecker};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Hosting platform recognized from a link's shape
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VideoPlatform {
    YouTube,
    Vimeo,
    TikTok,
    Dailymotion,
    Instagram,
    DirectFile,
}

static YOUTUBE_WATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)youtube\.com/watch\?v=[\w-]+").expect("valid regex"));
static YOUTUBE_SHORTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)youtube\.com/shorts/[\w-]+").expect("valid regex"));
static YOUTUBE_SHORT_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)youtu\.be/[\w-]+").expect("valid regex"));
static VIDEO_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:mp4|webm)(?:[?#].*)?$").expect("valid regex"));

static VIMEO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)vimeo\.com/(?:video/|channels/[\w-]+/)?\d+(?:[/?#]|$)").expect("valid regex")
});
static TIKTOK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)tiktok\.com/(?:@[\w.-]+/)?video/\d+").expect("valid regex")
});
static DAILYMOTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)dailymotion\.com/video/[a-z0-9]+").expect("valid regex"));
static INSTAGRAM_REEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)instagram\.com/reel/[\w-]+").expect("valid regex"));

/// Classify a URL into the single recognized video-link shape it matches
pub fn classify(url: &str) -> Option<VideoPlatform> {
    let url = url.trim();

    if YOUTUBE_WATCH.is_match(url) || YOUTUBE_SHORTS.is_match(url) || YOUTUBE_SHORT_LINK.is_match(url) {
        Some(VideoPlatform::YouTube)
    } else if VIDEO_FILE.is_match(url) {
        Some(VideoPlatform::DirectFile)
    } else if VIMEO.is_match(url) {
        Some(VideoPlatform::Vimeo)
    } else if TIKTOK.is_match(url) {
        Some(VideoPlatform::TikTok)
    } else if DAILYMOTION.is_match(url) {
        Some(VideoPlatform::Dailymotion)
    } else if INSTAGRAM_REEL.is_match(url) {
        Some(VideoPlatform::Instagram)
    } else {
        None
    }
}

/// True when the URL's shape alone implies playable content
/// (YouTube watch/shorts/short-link or a `.mp4`/`.webm` file).
pub fn is_direct(url: &str) -> bool {
    matches!(
        classify(url),
        Some(VideoPlatform::YouTube) | Some(VideoPlatform::DirectFile)
    )
}

/// Broad check used after extraction and on generated entries
pub fn is_valid(url: &str) -> bool {
    classify(url).is_some()
}

/// Only YouTube links are subject to the liveness lookup
pub fn is_youtube(url: &str) -> bool {
    classify(url) == Some(VideoPlatform::YouTube)
}
