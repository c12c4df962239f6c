/// On-disk TTL cache of search results keyed by normalized query
///
/// Only result URLs are stored, never video content.
use super::SearchProvider;
use crate::error::ProviderResult;
use crate::query::NormalizedQuery;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cached search results for one normalized query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCacheEntry {
    /// Unix timestamp (seconds) when the entry was written
    pub timestamp: i64,
    pub cache_key: String,
    pub query: String,
    pub urls: Vec<String>,
}

/// Cache statistics
#[derive(Debug, Default)]
pub struct CacheStats {
    pub total_files: usize,
    pub valid_files: usize,
    pub expired_files: usize,
    pub total_urls: usize,
}

/// Information about a cached query
#[derive(Debug, Clone)]
pub struct CachedQueryInfo {
    pub cache_key: String,
    pub query: String,
    pub url_count: usize,
    pub is_valid: bool,
    pub age_hours: i64,
    pub timestamp: i64,
}

/// Manages search cache files
#[derive(Debug, Clone)]
pub struct SearchCacheManager {
    cache_dir: PathBuf,
    ttl_hours: u64,
}

impl SearchCacheManager {
    pub fn new(cache_dir: PathBuf, ttl_hours: u64) -> Self {
        Self { cache_dir, ttl_hours }
    }

    /// Initialize cache directory
    pub async fn initialize(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        info!("📁 Search cache directory initialized: {}", self.cache_dir.display());
        Ok(())
    }

    /// Stable key for a normalized query
    pub fn cache_key(query: &str) -> String {
        format!("{:x}", md5::compute(query.as_bytes()))
    }

    fn entry_path(&self, cache_key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", cache_key))
    }

    fn is_entry_valid(&self, entry: &SearchCacheEntry) -> bool {
        Self::age_hours(entry) < self.ttl_hours as i64
    }

    fn age_hours(entry: &SearchCacheEntry) -> i64 {
        (Utc::now().timestamp() - entry.timestamp).max(0) / 3600
    }

    async fn read_entry(path: &Path) -> Option<SearchCacheEntry> {
        let content = tokio::fs::read_to_string(path).await.ok()?;
        match serde_json::from_str(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Failed to parse cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn json_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.cache_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Load cached URLs for a query if present and fresh
    pub async fn load(&self, query: &str) -> Option<Vec<String>> {
        let cache_key = Self::cache_key(query);
        let path = self.entry_path(&cache_key);

        let entry = Self::read_entry(&path).await?;
        if self.is_entry_valid(&entry) {
            debug!("Search cache hit for \"{}\" ({} urls)", query, entry.urls.len());
            Some(entry.urls)
        } else {
            debug!("Search cache expired for \"{}\"", query);
            let _ = tokio::fs::remove_file(&path).await;
            None
        }
    }

    /// Store URLs for a query
    pub async fn store(&self, query: &str, urls: &[String]) -> Result<()> {
        let cache_key = Self::cache_key(query);
        let entry = SearchCacheEntry {
            timestamp: Utc::now().timestamp(),
            cache_key: cache_key.clone(),
            query: query.to_string(),
            urls: urls.to_vec(),
        };

        tokio::fs::create_dir_all(&self.cache_dir).await?;
        let json_content = serde_json::to_string_pretty(&entry)?;
        tokio::fs::write(self.entry_path(&cache_key), json_content).await?;
        debug!("💾 Cached {} search results for \"{}\"", urls.len(), query);
        Ok(())
    }

    /// Remove expired cache files
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let mut cleaned = 0;
        for path in self.json_files().await? {
            if let Some(entry) = Self::read_entry(&path).await {
                if !self.is_entry_valid(&entry) && tokio::fs::remove_file(&path).await.is_ok() {
                    cleaned += 1;
                }
            }
        }

        if cleaned > 0 {
            info!("🧹 Cleaned up {} expired search cache files", cleaned);
        }
        Ok(cleaned)
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        for path in self.json_files().await? {
            stats.total_files += 1;
            if let Some(entry) = Self::read_entry(&path).await {
                if self.is_entry_valid(&entry) {
                    stats.valid_files += 1;
                    stats.total_urls += entry.urls.len();
                } else {
                    stats.expired_files += 1;
                }
            }
        }
        Ok(stats)
    }

    /// Remove the entry for one query; returns whether it existed
    pub async fn invalidate(&self, query: &str) -> Result<bool> {
        let path = self.entry_path(&Self::cache_key(query));
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
            info!("🗑️ Invalidated search cache for \"{}\"", query);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub async fn clear(&self) -> Result<usize> {
        let mut cleared = 0;
        for path in self.json_files().await? {
            if tokio::fs::remove_file(&path).await.is_ok() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// All cached queries, newest first
    pub async fn list(&self) -> Result<Vec<CachedQueryInfo>> {
        let mut list = Vec::new();
        for path in self.json_files().await? {
            if let Some(entry) = Self::read_entry(&path).await {
                list.push(CachedQueryInfo {
                    is_valid: self.is_entry_valid(&entry),
                    age_hours: Self::age_hours(&entry),
                    url_count: entry.urls.len(),
                    cache_key: entry.cache_key,
                    query: entry.query,
                    timestamp: entry.timestamp,
                });
            }
        }

        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(list)
    }
}

/// Search provider decorator that consults the cache first
pub struct CachedSearchProvider {
    inner: Arc<dyn SearchProvider>,
    cache: SearchCacheManager,
}

impl CachedSearchProvider {
    pub fn new(inner: Arc<dyn SearchProvider>, cache: SearchCacheManager) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl SearchProvider for CachedSearchProvider {
    async fn search(&self, query: &NormalizedQuery) -> ProviderResult<Vec<String>> {
        if let Some(urls) = self.cache.load(query.as_str()).await {
            return Ok(urls);
        }

        let urls = self.inner.search(query).await?;
        if !urls.is_empty() {
            if let Err(e) = self.cache.store(query.as_str(), &urls).await {
                warn!("Failed to write search cache: {}", e);
            }
        }
        Ok(urls)
    }
}
