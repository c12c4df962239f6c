//! API request handlers

use tracing::{debug, warn};

use super::models::{HealthResponse, ResolveRequest};
use crate::config::Config;
use crate::plan::ResolutionResult;
use crate::resolver::Resolver;

/// Handle health check requests
pub async fn health_check(resolver: &Resolver, config: &Config) -> HealthResponse {
    HealthResponse {
        status: "healthy".to_string(),
        service: "fitness-video-planner".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        search_configured: config.search.api_key.is_some(),
        llm_provider: format!("{:?}", config.llm.provider),
        llm_available: resolver.fallback_available().await,
    }
}

/// Decode a resolve request body.
///
/// An empty body is an empty query; anything else must be a JSON object.
pub fn parse_request(body: &[u8]) -> Result<ResolveRequest, ResolutionResult> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ResolveRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected resolve request body: {}", e);
        ResolutionResult::error(format!("invalid request body: {}", e))
    })
}

/// Handle flat resolution requests
pub async fn resolve(resolver: &Resolver, body: &[u8]) -> ResolutionResult {
    match parse_request(body) {
        Ok(request) => {
            debug!("POST /api/resolve \"{}\"", request.query);
            resolver.resolve(&request.query).await
        }
        Err(result) => result,
    }
}

/// Handle weekly plan requests
pub async fn resolve_weekly(resolver: &Resolver, body: &[u8]) -> ResolutionResult {
    match parse_request(body) {
        Ok(request) => {
            debug!("POST /api/resolve/weekly \"{}\"", request.query);
            resolver.resolve_weekly(&request.query).await
        }
        Err(result) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{HttpPageFetcher, HttpSearchProvider};
    use crate::plan::PlanAssembler;
    use std::sync::Arc;

    #[test]
    fn test_parse_request_accepts_query() {
        let request = parse_request(br#"{"query": "leg day"}"#).unwrap();
        assert_eq!(request.query, "leg day");
    }

    #[test]
    fn test_parse_request_missing_query_is_empty() {
        assert_eq!(parse_request(b"{}").unwrap().query, "");
        assert_eq!(parse_request(b"  ").unwrap().query, "");
    }

    #[test]
    fn test_parse_request_invalid_json_is_error_result() {
        let result = parse_request(b"not json").unwrap_err();
        assert!(result.is_error());
    }

    #[tokio::test]
    async fn test_health_check_without_model() {
        let config = Config::default();
        let resolver = Resolver::new(
            Arc::new(HttpSearchProvider::new(config.search.clone())),
            Arc::new(HttpPageFetcher::new(&config.extraction)),
            None,
            None,
            PlanAssembler::default(),
        );

        let health = health_check(&resolver, &config).await;
        assert_eq!(health.status, "healthy");
        assert!(!health.search_configured);
        assert!(!health.llm_available);
    }
}
