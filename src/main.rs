// sitemigrate binary: crawl, transform and asset phases of a site migration.

use anyhow::Result;
use clap::Parser;
use log::warn;

use sitemigrate::cli::{Cli, Commands};
use sitemigrate::crawl_engine::cleanup::CleanupResult;
use sitemigrate::{ChromiumRenderer, CrawlError, FsBlobStore, LogProgress, crawl_site, download_assets, transform_all};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.command.config()?;
    let store = FsBlobStore::new(config.output_dir());

    match cli.command {
        Commands::Crawl { .. } => {
            let renderer = ChromiumRenderer::launch(&config)
                .await
                .map_err(|e| CrawlError::Browser(format!("{e:#}")))?;
            let result = crawl_site(&config, &renderer, &store, LogProgress).await;

            // Shut the browser down on fatal errors too
            match renderer.shutdown().await {
                Ok(CleanupResult::Success) => {}
                Ok(CleanupResult::PartialFailure(errors)) => {
                    warn!(target: "sitemigrate::browser", "Browser cleanup incomplete: {}", errors.join("; "));
                }
                Err(e) => warn!(target: "sitemigrate::browser", "Browser cleanup failed: {e:#}"),
            }

            // LogProgress has already logged the run summary
            result?;
        }
        Commands::Assets { .. } => {
            let summary = download_assets(&store, &config).await?;
            if summary.failed > 0 {
                warn!(target: "sitemigrate::assets", "{} assets failed; re-run to retry", summary.failed);
            }
        }
        Commands::Transform { .. } => {
            let summary = transform_all(&store, &config.url_normalizer()?).await?;
            if summary.skipped > 0 {
                warn!(target: "sitemigrate::transform", "{} raw records could not be read", summary.skipped);
            }
        }
    }

    Ok(())
}
