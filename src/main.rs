use anyhow::{anyhow, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fitness_video_planner::{Config, Resolver};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let matches = Command::new("Fitness Video Planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Resolve fitness queries into exercise videos and weekly plans")
        .arg(
            Arg::new("query")
                .short('q')
                .long("query")
                .value_name("TEXT")
                .help("What to train, e.g. \"lower back stretch\"")
        )
        .arg(
            Arg::new("weekly")
                .short('w')
                .long("weekly")
                .help("Build a day-by-day weekly plan")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("NUM")
                .help("Seed for the weekly shuffle (reproducible plans)")
                .value_parser(clap::value_parser!(u64))
        )
        .arg(
            Arg::new("serve")
                .long("serve")
                .help("Run the HTTP API instead of resolving a single query")
                .action(clap::ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(&PathBuf::from(path))?,
        None => Config::load().unwrap_or_else(|e| {
            eprintln!("Failed to load config, using defaults: {}", e);
            Config::from_env()
        }),
    };

    let level = if matches.get_flag("verbose") { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fitness_video_planner={},warn", level)));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.planning.shuffle_seed = Some(*seed);
    }

    info!("{}", config.summary());
    if config.search.api_key.is_none() {
        warn!("No search API key configured; every query will use the generative fallback");
    }

    if matches.get_flag("serve") {
        return serve(config).await;
    }

    let query = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("--query is required unless --serve is given"))?;

    let resolver = Resolver::from_config(&config)?;

    let start_time = std::time::Instant::now();
    let result = if matches.get_flag("weekly") {
        resolver.resolve_weekly(query).await
    } else {
        resolver.resolve(query).await
    };
    info!("🎉 Resolved {} entries in {:.2}s", result.len(), start_time.elapsed().as_secs_f64());

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(feature = "api")]
async fn serve(config: Config) -> Result<()> {
    let resolver = Resolver::from_config(&config)?;
    fitness_video_planner::api::start_http_server(resolver, &config).await
}

#[cfg(not(feature = "api"))]
async fn serve(_config: Config) -> Result<()> {
    Err(anyhow!("this binary was built without the `api` feature"))
}
