//! Polar-volume processor service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pvol_processor::{
    BroadcastNotifier, CacheBackend, DirectoryWatcher, ProcessorConfig, PvolProcessor,
};
use scan_reader::{DirectoryStore, FlatBinaryDecoder};
use storage::{MemoryCache, RadarCache, RedisCache};

#[derive(Parser, Debug)]
#[command(name = "pvol-processor")]
#[command(about = "Background radar volume processor")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Process all known volumes once and exit
    #[arg(long)]
    once: bool,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => ProcessorConfig::load(path)?,
        None => ProcessorConfig::from_env(),
    };
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    info!(data_dir = %config.data_dir.display(), "starting pvol-processor");

    let cache: Arc<dyn RadarCache> = match &config.cache {
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Redis { url, ttl_secs } => Arc::new(
            RedisCache::connect_with_ttl(url, Duration::from_secs(*ttl_secs)).await?,
        ),
    };
    let store = Arc::new(DirectoryStore::new(
        &config.data_dir,
        Arc::new(FlatBinaryDecoder),
    ));
    let notifier = Arc::new(BroadcastNotifier::new(256));

    let processor = Arc::new(PvolProcessor::new(
        store,
        cache,
        notifier,
        config.clone(),
    ));

    if args.once {
        let images = processor.process_all().await?;
        info!(images, "single run complete");
        return Ok(());
    }

    if config.process_on_startup {
        let sweeper = Arc::clone(&processor);
        tokio::spawn(async move {
            match sweeper.process_all().await {
                Ok(images) => info!(images, "startup sweep complete"),
                Err(e) => tracing::error!(error = %e, "startup sweep failed"),
            }
        });
    }

    let watcher_handle = if config.watch_directory {
        let watcher = DirectoryWatcher::new(
            &config.data_dir,
            Duration::from_secs(config.poll_interval_secs),
            Duration::from_millis(config.debounce_ms),
        );
        Some(watcher.spawn(Arc::clone(&processor)))
    } else {
        None
    };

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    processor.shutdown();
    if let Some(handle) = watcher_handle {
        let _ = handle.await;
    }

    Ok(())
}
