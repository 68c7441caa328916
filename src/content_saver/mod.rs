//! Key-value JSON persistence for crawl artifacts and clean content.
//!
//! Keys are slash-separated (`news/spring-gala`, `site-map`). The scheduler
//! and the transformer only talk to the [`BlobStore`] trait; the filesystem
//! store is used by the binary, the in-memory store by tests.

mod fs_store;
mod memory_store;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use fs_store::FsBlobStore;
pub use memory_store::MemoryBlobStore;

/// Site-map of every visited page: `[{url, type, title}]`
pub const SITE_MAP_KEY: &str = "site-map";
pub const NAVIGATION_KEY: &str = "navigation";
/// Flat, deduplicated array of image URLs
pub const IMAGES_KEY: &str = "images";
pub const ASSET_MAP_KEY: &str = "asset-map";

pub const CONTENT_NEWS_KEY: &str = "content/news";
pub const CONTENT_SCHOLARSHIPS_KEY: &str = "content/scholarships";
pub const CONTENT_PAGES_KEY: &str = "content/pages";
pub const CONTENT_NAV_KEY: &str = "content/nav";

/// Key of a raw page record
#[must_use]
pub fn record_key(partition: &str, slug: &str) -> String {
    format!("{partition}/{slug}")
}

/// JSON blob store, directory-scoped by key prefix
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    /// Make sure the store is writable. Called once before a run.
    async fn prepare(&self) -> Result<()>;

    async fn write(&self, key: &str, value: &Value) -> Result<()>;

    /// `Ok(None)` when the key does not exist
    async fn read(&self, key: &str) -> Result<Option<Value>>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Keys directly under `prefix` (`news` lists `news/*`), sorted
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Serialise `value` and write it under `key`
pub async fn write_json<S, T>(store: &S, key: &str, value: &T) -> Result<()>
where
    S: BlobStore,
    T: Serialize,
{
    let value = serde_json::to_value(value)?;
    store.write(key, &value).await
}

/// Read and deserialise `key`, `Ok(None)` when absent
pub async fn read_json<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: BlobStore,
    T: DeserializeOwned,
{
    match store.read(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}
