use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::llm::{LLMConfig, LLMProvider};

/// Video-hosting domains the search call is restricted to
pub const DEFAULT_ALLOWED_DOMAINS: [&str; 4] = [
    "youtube.com",
    "vimeo.com",
    "dailymotion.com",
    "tiktok.com",
];

/// Bounds on the number of results requested from the search API
pub const MIN_SEARCH_RESULTS: u32 = 10;
pub const MAX_SEARCH_RESULTS: u32 = 15;

/// Configuration for the fitness video planner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,

    /// Structured search provider settings
    pub search: SearchConfig,

    /// Page fetch / embedded video extraction settings
    pub extraction: ExtractionConfig,

    /// Liveness (oEmbed) check settings
    pub liveness: LivenessConfig,

    /// Generative fallback model settings
    pub llm: LLMConfig,

    /// Plan assembly policy
    pub planning: PlanningConfig,

    /// Search result cache
    pub cache: CacheConfig,

    /// HTTP API server
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search API endpoint (POST)
    pub endpoint: String,

    /// Bearer token for the search API
    pub api_key: Option<String>,

    /// Requested result count, clamped to 10..=15
    pub max_results: u32,

    /// Domains the search is scoped to
    pub allowed_domains: Vec<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Per-page fetch timeout in seconds
    pub timeout_seconds: u64,

    /// User agent sent with page fetches
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    /// Check YouTube links before they enter a weekly plan
    pub enabled: bool,

    /// oEmbed endpoint queried with `?url=<video>&format=json`
    pub oembed_endpoint: String,

    /// Per-lookup timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Maximum number of days in a weekly plan
    pub max_days: usize,

    /// Validated videos needed before the generative fallback is skipped
    pub min_weekly_videos: usize,

    /// Fixed seed for the weekly shuffle (random when unset)
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache search results on disk
    pub enabled: bool,

    /// Cache directory
    pub cache_dir: PathBuf,

    /// Cache TTL in hours
    pub ttl_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            api_key: None,
            max_results: 12,
            allowed_domains: DEFAULT_ALLOWED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            timeout_seconds: 15,
        }
    }
}

impl SearchConfig {
    /// Result count actually sent to the API
    pub fn bounded_max_results(&self) -> u32 {
        self.max_results.clamp(MIN_SEARCH_RESULTS, MAX_SEARCH_RESULTS)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 8,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            oembed_endpoint: "https://www.youtube.com/oembed".to_string(),
            timeout_seconds: 5,
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            max_days: 7,
            min_weekly_videos: 3,
            shuffle_seed: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cache_dir: PathBuf::from("./cache/search"),
            ttl_hours: 24,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            search: SearchConfig::default(),
            extraction: ExtractionConfig::default(),
            liveness: LivenessConfig::default(),
            llm: LLMConfig::default(),
            planning: PlanningConfig::default(),
            cache: CacheConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then environment
    pub fn load() -> Result<Self> {
        let mut config_paths = vec![
            PathBuf::from("fitness-planner.toml"),
            PathBuf::from("config/fitness-planner.toml"),
        ];
        if let Ok(home) = std::env::var("HOME") {
            config_paths.push(Path::new(&home).join(".config/fitness-planner/config.toml"));
        }
        config_paths.push(PathBuf::from("/etc/fitness-planner/config.toml"));

        for path in &config_paths {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => {
                    tracing::info!("📄 Loaded configuration from: {}", path.display());
                    return Ok(config.apply_env());
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
                }
            }
        }

        Ok(Self::from_env())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    fn apply_env(mut self) -> Self {
        if let Ok(api_key) = std::env::var("FITNESS_PLANNER_SEARCH_API_KEY") {
            self.search.api_key = Some(api_key);
        }

        if let Ok(endpoint) = std::env::var("FITNESS_PLANNER_SEARCH_ENDPOINT") {
            self.search.endpoint = endpoint;
        }

        if let Ok(api_key) = std::env::var("FITNESS_PLANNER_LLM_API_KEY") {
            self.llm.api_key = Some(api_key);
        }

        if let Ok(provider) = std::env::var("FITNESS_PLANNER_LLM_PROVIDER") {
            match provider.to_lowercase().as_str() {
                "lmstudio" => self.llm.provider = LLMProvider::LMStudio,
                "gemini" => self.llm.provider = LLMProvider::Gemini,
                "openai" => self.llm.provider = LLMProvider::OpenAI,
                other => tracing::warn!("Unknown LLM provider in environment: {}", other),
            }
        }

        if let Ok(min) = std::env::var("FITNESS_PLANNER_MIN_WEEKLY_VIDEOS") {
            self.planning.min_weekly_videos = min.parse().unwrap_or(3);
        }

        if let Ok(log_level) = std::env::var("FITNESS_PLANNER_LOG_LEVEL") {
            self.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.planning.max_days == 0 || self.planning.max_days > 7 {
            return Err(anyhow!("planning.max_days must be between 1 and 7"));
        }

        if self.planning.min_weekly_videos > self.planning.max_days {
            return Err(anyhow!(
                "planning.min_weekly_videos ({}) cannot exceed planning.max_days ({})",
                self.planning.min_weekly_videos,
                self.planning.max_days
            ));
        }

        if self.search.allowed_domains.is_empty() {
            return Err(anyhow!("search.allowed_domains must not be empty"));
        }

        if self.extraction.timeout_seconds == 0 || self.liveness.timeout_seconds == 0 {
            return Err(anyhow!("timeouts must be greater than 0"));
        }

        match self.llm.provider {
            LLMProvider::OpenAI | LLMProvider::Gemini => {
                if self.llm.api_key.is_none() {
                    tracing::warn!("No API key for {:?}; generative fallback will return nothing", self.llm.provider);
                }
            }
            LLMProvider::LMStudio => {
                if self.llm.endpoint.is_none() {
                    return Err(anyhow!("llm.endpoint required for LMStudio provider"));
                }
            }
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Fitness Planner Configuration:\n\
            - Search Endpoint: {}\n\
            - Search Key: {}\n\
            - Allowed Domains: {}\n\
            - LLM Provider: {:?} ({})\n\
            - Liveness Checks: {}\n\
            - Weekly Plan: {} days, fallback below {} videos\n\
            - Search Cache: {}",
            self.search.endpoint,
            if self.search.api_key.is_some() { "set" } else { "missing" },
            self.search.allowed_domains.join(", "),
            self.llm.provider,
            self.llm.model,
            self.liveness.enabled,
            self.planning.max_days,
            self.planning.min_weekly_videos,
            if self.cache.enabled { self.cache.cache_dir.display().to_string() } else { "disabled".to_string() },
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_search_api_key(mut self, api_key: String) -> Self {
        self.config.search.api_key = Some(api_key);
        self
    }

    pub fn with_search_endpoint(mut self, endpoint: String) -> Self {
        self.config.search.endpoint = endpoint;
        self
    }

    pub fn with_llm_provider(mut self, provider: LLMProvider) -> Self {
        self.config.llm.provider = provider;
        self
    }

    pub fn with_min_weekly_videos(mut self, min: usize) -> Self {
        self.config.planning.min_weekly_videos = min;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.config.planning.shuffle_seed = Some(seed);
        self
    }

    pub fn enable_liveness(mut self, enable: bool) -> Self {
        self.config.liveness.enabled = enable;
        self
    }

    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.config.cache.enabled = true;
        self.config.cache.cache_dir = dir;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
