use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use minestats::{
    arguments::Args,
    cache::SnapshotCache,
    logger::{self, LogTag},
    store,
    webserver::{self, AppState},
};

/// Main entry point for minestats
///
/// Loads configuration (file, environment, then command line), builds the
/// page source and snapshot cache, optionally warms the cache, and serves
/// HTTP until Ctrl-C.
#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    logger::init_with(args.logger_config());

    logger::info(
        LogTag::System,
        &format!("minestats v{} starting up...", env!("CARGO_PKG_VERSION")),
    );

    let debug_modes = args.enabled_debug_modes();
    if !debug_modes.is_empty() {
        logger::info(
            LogTag::System,
            &format!("Debug modes enabled: {}", debug_modes.join(", ")),
        );
    }

    let config = args
        .resolve_config(|key| std::env::var(key).ok())
        .with_context(|| format!("failed to resolve configuration from {}", args.config))?;

    let source = store::build_source(&config.store).context("failed to build page source")?;
    let cache = Arc::new(SnapshotCache::new(
        source,
        Duration::from_secs(config.cache.refresh_interval_secs),
    ));

    if config.cache.warm_on_startup {
        match cache.refresh().await {
            Ok(snapshot) => logger::info(
                LogTag::Cache,
                &format!("Cache warmed with {} records", snapshot.len()),
            ),
            Err(err) => logger::warning(
                LogTag::Cache,
                &format!("Cache warm-up failed, first request will retry: {}", err),
            ),
        }
    }

    let state = Arc::new(AppState::new(cache, config.webserver.clone()));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            logger::error(
                LogTag::System,
                &format!("Failed to listen for Ctrl-C: {}", e),
            );
            std::future::pending::<()>().await;
        }
    };

    webserver::start_server(state, shutdown)
        .await
        .map_err(|e| anyhow!(e))?;

    logger::info(LogTag::System, "minestats stopped");
    Ok(())
}
