/// Liveness confirmation for YouTube links via oEmbed
use super::is_youtube;
use crate::config::LivenessConfig;
use crate::error::{ProviderError, ProviderResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

const PROVIDER: &str = "oembed";

/// Metadata lookup that confirms a video still exists and is public
#[async_trait]
pub trait LivenessChecker: Send + Sync {
    /// `Ok` means the lookup answered HTTP 200
    async fn lookup(&self, url: &str) -> ProviderResult<()>;
}

/// oEmbed-backed checker
pub struct OEmbedLivenessChecker {
    client: Client,
    endpoint: String,
}

impl OEmbedLivenessChecker {
    pub fn new(config: &LivenessConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            endpoint: config.oembed_endpoint.clone(),
        }
    }

    fn lookup_url(&self, video_url: &str) -> String {
        format!(
            "{}?url={}&format=json",
            self.endpoint,
            urlencoding::encode(video_url)
        )
    }
}

#[async_trait]
impl LivenessChecker for OEmbedLivenessChecker {
    async fn lookup(&self, url: &str) -> ProviderResult<()> {
        let response = self
            .client
            .get(self.lookup_url(url))
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if response.status() != StatusCode::OK {
            return Err(ProviderError::status(PROVIDER, response.status()));
        }

        Ok(())
    }
}

/// Decide whether a validated link may be handed to the user.
///
/// Non-YouTube links skip the lookup and count as playable. For YouTube,
/// any lookup failure means "do not include".
pub async fn is_playable(checker: &dyn LivenessChecker, url: &str) -> bool {
    if !is_youtube(url) {
        return true;
    }

    match checker.lookup(url).await {
        Ok(()) => true,
        Err(e) => {
            debug!("Dropping unplayable video {}: {}", url, e);
            false
        }
    }
}
