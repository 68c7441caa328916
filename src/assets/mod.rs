//! Media asset transfer for images referenced by crawled pages.

pub mod downloader;

pub use downloader::{AssetMap, AssetMapEntry, AssetSummary, asset_file_name, download_assets};
