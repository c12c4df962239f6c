/// Search API client scoped to video-hosting domains
use super::SearchProvider;
use crate::config::SearchConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::query::NormalizedQuery;
use crate::validation::is_direct;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const PROVIDER: &str = "search";

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    include_domains: &'a [String],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    url: String,
}

/// HTTP search provider (Tavily-compatible request/response shape)
pub struct HttpSearchProvider {
    client: Client,
    config: SearchConfig,
}

impl HttpSearchProvider {
    pub fn new(config: SearchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    /// Direct video links are kept wherever they are hosted; pages must sit
    /// on an allowed domain
    fn keep_result(&self, url: &str) -> bool {
        is_direct(url) || is_allowed_host(url, &self.config.allowed_domains)
    }
}

/// True when the URL's host is one of `domains` or a subdomain of one
pub fn is_allowed_host(url: &str, domains: &[String]) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.to_lowercase();

    domains.iter().any(|domain| {
        let domain = domain.to_lowercase();
        host == domain || host.ends_with(&format!(".{}", domain))
    })
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &NormalizedQuery) -> ProviderResult<Vec<String>> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::not_configured(PROVIDER, "API key missing"))?;

        let request = SearchRequest {
            query: query.as_str(),
            max_results: self.config.bounded_max_results(),
            include_domains: &self.config.allowed_domains,
        };

        debug!("Searching for \"{}\" (max {})", query, request.max_results);

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transport(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(ProviderError::status(PROVIDER, response.status()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::decode(PROVIDER, e.to_string()))?;

        let total = body.results.len();
        let urls: Vec<String> = body
            .results
            .into_iter()
            .map(|hit| hit.url)
            .filter(|url| self.keep_result(url))
            .collect();

        info!("🔎 Search returned {} results ({} on allowed domains)", total, urls.len());
        Ok(urls)
    }
}
