use anyhow::Result;
use clap::{Parser, Subcommand};
use fitness_video_planner::discovery::SearchCacheManager;
use fitness_video_planner::query::normalize;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "search-cache")]
#[command(about = "Search result cache management utility")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "./cache/search")]
    cache_dir: PathBuf,

    #[arg(long, default_value_t = 24)]
    ttl_hours: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// List all cached queries
    List,
    /// Get cache statistics
    Stats,
    /// Invalidate the cached results for a query
    Invalidate {
        /// Query as a user would type it (e.g., "lower back stretch")
        query: String,
    },
    /// Clear all cache entries
    Clear,
    /// Clean up expired cache entries
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let cli = Cli::parse();

    let cache_manager = SearchCacheManager::new(cli.cache_dir, cli.ttl_hours);
    cache_manager.initialize().await?;

    match cli.command {
        Commands::List => {
            let queries = cache_manager.list().await?;

            if queries.is_empty() {
                info!("📭 No cached queries found");
                return Ok(());
            }

            info!("📚 Found {} cached queries:", queries.len());

            for entry in queries {
                let status = if entry.is_valid { "✅ Valid" } else { "❌ Expired" };
                info!("  {} - {} urls, {} hours old, {}",
                     entry.cache_key,
                     entry.url_count,
                     entry.age_hours,
                     status);
                info!("    Query: {}", entry.query);
            }
        }

        Commands::Stats => {
            let stats = cache_manager.stats().await?;
            info!("📊 Cache Statistics:");
            info!("  Total files: {}", stats.total_files);
            info!("  Valid files: {}", stats.valid_files);
            info!("  Expired files: {}", stats.expired_files);
            info!("  Total urls: {}", stats.total_urls);
        }

        Commands::Invalidate { query } => {
            // Entries are keyed by the normalized form
            let normalized = normalize(&query);
            if cache_manager.invalidate(normalized.as_str()).await? {
                info!("✅ Successfully invalidated cache for: {}", query);
            } else {
                warn!("⚠️ No cache entry for: {}", query);
            }
        }

        Commands::Clear => {
            let cleared = cache_manager.clear().await?;
            info!("🗑️ Cleared {} cache entries", cleared);
        }

        Commands::Cleanup => {
            let cleaned = cache_manager.cleanup_expired().await?;
            info!("🧹 Cleaned up {} expired cache entries", cleaned);
        }
    }

    Ok(())
}
