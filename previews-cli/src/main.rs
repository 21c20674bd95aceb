use std::time::Duration;

use clap::Parser;
use previews_engine::{PreviewConfig, PreviewError, PreviewManager};
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod error;
mod output;

use cli::CliArgs;
use error::AppError;

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        // Log the full error for debugging
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    // Parse command-line arguments
    let args = CliArgs::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Initialization(e.to_string()))?;

    let config = PreviewConfig::builder()
        .with_owner(args.owner.clone())
        .with_token(args.token.clone())
        .with_max_workers(args.workers)
        .with_caching_enabled(!args.no_cache)
        .with_cache_dir(&args.cache_dir)
        .with_cache_ttl_seconds(args.cache_ttl)
        .with_request_timeout(Duration::from_secs(args.timeout))
        .with_skip_default_previews(!args.keep_default_previews)
        .build();

    let previews = collect(config).await?;

    if previews.is_empty() {
        info!("No usable previews were found");
        return Ok(());
    }

    let written = output::write_previews(&args.output_dir, &previews).await?;
    info!(
        count = written,
        dir = %args.output_dir.display(),
        "Wrote preview images"
    );

    Ok(())
}

/// Run the manager; if the cache directory turns out to be unusable,
/// fall back to a cacheless run instead of giving up.
async fn collect(
    config: PreviewConfig,
) -> Result<std::collections::HashMap<String, bytes::Bytes>, AppError> {
    let use_cache = config.use_cache;
    let manager = PreviewManager::new(config.clone());

    match manager.run().await {
        Ok(previews) => Ok(previews),
        Err(e @ PreviewError::StorageUnavailable { .. }) if use_cache => {
            warn!(error = %e, "Cache unavailable, retrying without it");
            let mut retry_config = config;
            retry_config.use_cache = false;
            Ok(PreviewManager::new(retry_config).run().await?)
        }
        Err(e) => Err(e.into()),
    }
}
