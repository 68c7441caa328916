use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::Value;
use tokio::sync::Mutex;

use super::BlobStore;

/// In-process store keyed exactly like [`super::FsBlobStore`]
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Value>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored key, sorted
    pub async fn keys(&self) -> Vec<String> {
        self.blobs.lock().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    async fn prepare(&self) -> Result<()> {
        Ok(())
    }

    async fn write(&self, key: &str, value: &Value) -> Result<()> {
        self.blobs.lock().await.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.blobs.lock().await.get(key).cloned())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.lock().await.contains_key(key))
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_matches('/');
        let blobs = self.blobs.lock().await;
        Ok(blobs
            .keys()
            .filter(|key| match key.rsplit_once('/') {
                Some((dir, _)) => dir == prefix,
                None => prefix.is_empty(),
            })
            .cloned()
            .collect())
    }
}
