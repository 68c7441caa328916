//! Resumable image download over the crawl's image manifest.
//!
//! Downloads run through a bounded `buffer_unordered` pool; each image
//! succeeds or fails on its own. Completed downloads are recorded in the
//! `asset-map` blob, checkpointed periodically, so an interrupted run picks
//! up where it stopped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::StreamExt;
use futures::stream;
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use url::Url;
use xxhash_rust::xxh3::xxh3_64;

use crate::config::MigrationConfig;
use crate::content_saver::{ASSET_MAP_KEY, BlobStore, IMAGES_KEY, read_json, write_json};
use crate::utils::{ASSET_DOWNLOAD_TIMEOUT_SECS, CHROME_USER_AGENT, is_valid_url};

/// One downloaded asset, keyed by its source URL in the asset map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMapEntry {
    /// File name relative to the asset directory
    pub file: String,
    pub bytes: u64,
}

pub type AssetMap = BTreeMap<String, AssetMapEntry>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetSummary {
    /// URLs in the image manifest
    pub total: usize,
    pub downloaded: usize,
    /// Already present from a prior run
    pub reused: usize,
    pub failed: usize,
}

/// Local file name for an asset URL: `<xxh3-hex>-<sanitised basename>`
#[must_use]
pub fn asset_file_name(url: &str) -> String {
    let basename = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .map(sanitize_filename::sanitize)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "asset".to_string());

    format!("{:016x}-{basename}", xxh3_64(url.as_bytes()))
}

/// Download every image of the manifest not already in the asset map
pub async fn download_assets<S: BlobStore>(store: &S, config: &MigrationConfig) -> Result<AssetSummary> {
    let asset_dir = config.asset_dir();
    tokio::fs::create_dir_all(&asset_dir)
        .await
        .with_context(|| format!("Failed to create asset directory {}", asset_dir.display()))?;

    let images: Vec<String> = read_json(store, IMAGES_KEY).await?.unwrap_or_default();
    let mut asset_map: AssetMap = read_json(store, ASSET_MAP_KEY).await?.unwrap_or_default();

    let mut summary = AssetSummary {
        total: images.len(),
        ..AssetSummary::default()
    };

    let mut pending = Vec::new();
    for url in images {
        if !is_valid_url(&url) {
            debug!(target: "sitemigrate::assets", "Skipping non-http asset {url}");
            summary.failed += 1;
            continue;
        }
        let present = match asset_map.get(&url) {
            Some(entry) => tokio::fs::try_exists(asset_dir.join(&entry.file))
                .await
                .unwrap_or(false),
            None => false,
        };
        if present {
            summary.reused += 1;
        } else {
            pending.push(url);
        }
    }

    info!(
        target: "sitemigrate::assets",
        "{} assets to download ({} already present)",
        pending.len(),
        summary.reused
    );

    let client = Client::builder()
        .timeout(Duration::from_secs(ASSET_DOWNLOAD_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")?;

    let checkpoint_interval = config.asset_checkpoint_interval();
    let mut downloads = stream::iter(pending)
        .map(|url| {
            let client = client.clone();
            let asset_dir = asset_dir.clone();
            async move {
                let result = download_one(&client, &url, &asset_dir).await;
                (url, result)
            }
        })
        .buffer_unordered(config.asset_concurrency());

    while let Some((url, result)) = downloads.next().await {
        match result {
            Ok(entry) => {
                debug!(target: "sitemigrate::assets", "Downloaded {url} -> {} ({} bytes)", entry.file, entry.bytes);
                asset_map.insert(url, entry);
                summary.downloaded += 1;
                if summary.downloaded % checkpoint_interval == 0 {
                    write_json(store, ASSET_MAP_KEY, &asset_map).await?;
                    info!(
                        target: "sitemigrate::assets",
                        "Checkpointed asset map ({} entries)",
                        asset_map.len()
                    );
                }
            }
            Err(e) => {
                warn!(target: "sitemigrate::assets", "Failed to download {url}: {e:#}");
                summary.failed += 1;
            }
        }
    }

    write_json(store, ASSET_MAP_KEY, &asset_map).await?;
    info!(
        target: "sitemigrate::assets",
        "Assets complete: {} downloaded, {} reused, {} failed of {}",
        summary.downloaded,
        summary.reused,
        summary.failed,
        summary.total
    );
    Ok(summary)
}

/// Stream one asset to `<asset_dir>/<file>` through a temporary `.part` file
async fn download_one(client: &Client, url: &str, asset_dir: &Path) -> Result<AssetMapEntry> {
    let response = client
        .get(url)
        .header("User-Agent", CHROME_USER_AGENT)
        .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
        .send()
        .await
        .context("Request failed")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("HTTP status {status}"));
    }

    let file = asset_file_name(url);
    let target = asset_dir.join(&file);
    let partial = PathBuf::from(format!("{}.part", target.display()));

    let mut output = tokio::fs::File::create(&partial)
        .await
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut bytes = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                drop(output);
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(anyhow::Error::new(e).context("Failed to read response body"));
            }
        };
        output.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    output.flush().await?;
    drop(output);

    tokio::fs::rename(&partial, &target)
        .await
        .with_context(|| format!("Failed to move download into {}", target.display()))?;

    Ok(AssetMapEntry { file, bytes })
}
