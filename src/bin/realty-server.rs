//! REALTY Server Binary
//!
//! Loads the data directory and serves search and recommendation requests.
//! Refuses to start if any backing table fails to load.

use anyhow::Context;
use clap::Parser;
use realty::{Config, DataContext, Server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// REALTY Server - Property Search and Recommendations
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Port number
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Directory containing location_distance.json and cosine_sim{1,2,3}.json
    #[arg(short, long, default_value = "./datasets")]
    data_dir: PathBuf,

    /// Number of worker threads (0 = auto-detect based on CPU cores)
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Response cache TTL in seconds (0 = disable caching)
    #[arg(long, default_value_t = 60)]
    cache_ttl: u64,

    /// Expired-response cleaner interval in seconds
    #[arg(long, default_value_t = 10)]
    cache_cleaner_interval: u64,

    /// Maximum number of cached responses
    #[arg(long, default_value_t = realty::cache::DEFAULT_MAX_ENTRIES)]
    cache_max_entries: usize,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("realty=info".parse()?))
        .init();

    let args = Args::parse();

    let config = Config::default()
        .with_bind(&args.bind)
        .with_port(args.port)
        .with_data_dir(&args.data_dir)
        .with_workers(args.workers)
        .with_cache_ttl(args.cache_ttl)
        .with_cache_cleaner_interval(args.cache_cleaner_interval)
        .with_cache_max_entries(args.cache_max_entries);

    let data = DataContext::load(&config.data_dir)
        .with_context(|| format!("failed to load data from {}", config.data_dir.display()))?;

    let workers = config.worker_threads();
    info!(
        "Starting REALTY server on {} with {} workers",
        config.addr(),
        workers
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let server = Server::new(config, Arc::new(data))?;
        server.run().await?;
        Ok::<(), anyhow::Error>(())
    })
}
