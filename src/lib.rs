//! Website migration pipeline.
//!
//! A rendered-browser crawl persists one raw record per page, an offline
//! transform derives clean content records from them, and an asset pass
//! downloads every image the crawl referenced.

pub mod assets;
pub mod browser_setup;
pub mod cli;
pub mod config;
pub mod content_saver;
pub mod content_transform;
pub mod crawl_engine;
pub mod page_extractor;
pub mod render;
pub mod utils;

pub use assets::{AssetMap, AssetMapEntry, AssetSummary, download_assets};
pub use config::MigrationConfig;
pub use content_saver::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use content_transform::{TransformSummary, transform_all};
pub use crawl_engine::{
    ContentType, CrawlError, CrawlResult, CrawlSummary, LogProgress, NoOpProgress, ProgressReporter,
    Scheduler, classify_url, crawl_site,
};
pub use page_extractor::schema::*;
pub use render::{ChromiumRenderer, PageRenderer, RenderedPage};
pub use utils::UrlNormalizer;
