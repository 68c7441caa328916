use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::time::timeout;

use super::BlobStore;

/// Timeout for blocking serialisation and file writes
/// Prevents hangs on pathological data or a stalled disk
const BLOCKING_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

const EXTENSION: &str = "json";

/// Stores each key as a pretty-printed `<root>/<key>.json` file
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for `key`; rejects keys that would escape the root
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                anyhow::bail!("Invalid blob key: {key:?}");
            }
            path.push(segment);
        }
        path.set_extension(EXTENSION);
        Ok(path)
    }
}

impl BlobStore for FsBlobStore {
    async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create output directory {}", self.root.display()))
    }

    async fn write(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key)?;
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Path has no parent directory"))?
            .to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;

        let value = value.clone();
        let target = path.clone();
        // Serialise and write off the runtime: records can carry large HTML
        let blocking_task = tokio::task::spawn_blocking(move || -> Result<()> {
            let json = serde_json::to_vec_pretty(&value)?;
            // Temp file in the target directory, then an atomic rename
            let mut temp_file = NamedTempFile::new_in(&parent)?;
            temp_file.write_all(&json)?;
            temp_file.write_all(b"\n")?;
            temp_file.persist(&target)?;
            Ok(())
        });

        match timeout(BLOCKING_WRITE_TIMEOUT, blocking_task).await {
            Ok(Ok(result)) => result.with_context(|| format!("Failed to write {}", path.display())),
            Ok(Err(e)) => Err(anyhow::anyhow!("Blob write task panicked: {e}")),
            Err(_) => {
                log::warn!(
                    target: "sitemigrate::storage",
                    "Blob write timeout for {} (timeout: {BLOCKING_WRITE_TIMEOUT:?})",
                    path.display()
                );
                Err(anyhow::anyhow!(
                    "Blob write timed out after {BLOCKING_WRITE_TIMEOUT:?} for key {key}"
                ))
            }
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        Ok(Some(value))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix = prefix.trim_matches('/');
        let dir = if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {}", dir.display()));
            }
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if prefix.is_empty() {
                keys.push(stem.to_string());
            } else {
                keys.push(format!("{prefix}/{stem}"));
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_read_list() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsBlobStore::new(dir.path());
        store.prepare().await.expect("prepare");

        store.write("news/b", &json!({"n": 2})).await.expect("write");
        store.write("news/a", &json!({"n": 1})).await.expect("write");
        store.write("site-map", &json!([])).await.expect("write");

        assert!(dir.path().join("news/a.json").exists());
        assert_eq!(store.read("news/a").await.expect("read"), Some(json!({"n": 1})));
        assert_eq!(store.read("news/zzz").await.expect("read"), None);
        assert!(store.exists("site-map").await.expect("exists"));
        assert_eq!(
            store.list_keys("news").await.expect("list"),
            vec!["news/a".to_string(), "news/b".to_string()]
        );
        assert!(store.list_keys("grants").await.expect("list").is_empty());
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let store = FsBlobStore::new("/tmp/out");
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("news//x").is_err());
        assert_eq!(
            store.path_for("news/x").expect("valid key"),
            PathBuf::from("/tmp/out/news/x.json")
        );
    }
}
