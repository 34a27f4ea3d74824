//! covidsync - pandemic statistics synchronizer
//!
//! Fetches global, per-country and German regional COVID-19 figures,
//! resolves and aggregates them, and reconciles the result into a
//! persisted state tree. One invocation performs one run.
//!
//! Exit codes:
//!   0 - Run completed (also when upstream services were unreachable)
//!   1 - Invalid arguments or configuration, or the state tree could not be saved

mod analysis;
mod cli;
mod config;
mod error;
mod feeds;
#[cfg(test)]
mod log_capture;
mod models;
mod pipeline;
mod reconcile;
mod resolver;
mod store;
mod transform;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use feeds::HttpFeeds;
use pipeline::Runner;
use std::path::Path;
use std::sync::Arc;
use store::JsonStore;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("covidsync v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run_sync(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .covidsync.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("Edit it to select countries, German regions and feed URLs.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration, open the store and execute one run.
async fn run_sync(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let store_path = Path::new(&config.general.store_path).to_path_buf();
    let store = Arc::new(JsonStore::open(&store_path)?);
    let feeds = Arc::new(HttpFeeds::new(
        config.sources.clone(),
        config.general.request_timeout_seconds,
    )?);

    info!(
        "Synchronizing into {} (delete unused: {})",
        store_path.display(),
        config.general.delete_unused
    );

    let summary = Runner::new(config, feeds, store.clone()).run().await?;
    debug!("State tree holds {} objects", store.object_ids().await.len());

    if !summary.unresolved.is_empty() {
        warn!(
            "{} country names could not be resolved: {}",
            summary.unresolved.len(),
            summary.unresolved.join(", ")
        );
    }
    if !summary.missing_attributes.is_empty() {
        debug!(
            "Attributes without metadata: {}",
            summary.missing_attributes.join(", ")
        );
    }

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
