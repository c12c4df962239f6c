//! API data models

use serde::{Deserialize, Serialize};

/// Body of `POST /api/resolve` and `POST /api/resolve/weekly`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub query: String,
}

/// Health check payload
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub search_configured: bool,
    pub llm_provider: String,
    pub llm_available: bool,
}
