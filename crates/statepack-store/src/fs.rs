//! Filesystem-backed store.

use anyhow::{anyhow, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::paths::{atomic_write_json, decode_key, entry_path, ENTRY_EXTENSION};
use crate::LocalStore;

/// Durable store keeping one JSON file per key under a cache root.
pub struct FsStore {
    cache_root: Arc<Path>,
}

impl FsStore {
    /// Create a store rooted at `cache_root`, creating the directory if needed.
    pub fn new<P: AsRef<Path>>(cache_root: P) -> Result<Self> {
        let cache_root = cache_root.as_ref().to_path_buf();
        std::fs::create_dir_all(&cache_root)
            .map_err(|e| anyhow!("Failed to create cache root {}: {}", cache_root.display(), e))?;
        debug!(root = %cache_root.display(), "opened filesystem pack store");
        Ok(Self {
            cache_root: Arc::from(cache_root),
        })
    }

    /// Get the cache root path.
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }
}

impl LocalStore for FsStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = entry_path(&self.cache_root, key);
        if !path.exists() {
            return None;
        }
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(key, path = %path.display(), error = %e, "unreadable cache entry");
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, path = %path.display(), error = %e, "malformed cache entry, ignoring");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        atomic_write_json(&entry_path(&self.cache_root, key), value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = entry_path(&self.cache_root, key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow!("Failed to remove {}: {}", path.display(), e)),
        }
    }

    fn keys(&self, prefix: &str) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.cache_root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(root = %self.cache_root.display(), error = %e, "cannot list cache root");
                return Vec::new();
            }
        };

        let mut keys: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(decode_key)
            })
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = FsStore::new(temp_dir.path())?;

        assert_eq!(store.get("pack:GA:1:seed"), None);

        let value = json!({ "cachedAt": "2026-02-20T00:00:00Z", "payload": { "state": "GA" } });
        store.set("pack:GA:1:seed", &value)?;
        assert_eq!(store.get("pack:GA:1:seed"), Some(value));

        store.remove("pack:GA:1:seed")?;
        assert_eq!(store.get("pack:GA:1:seed"), None);

        // idempotent
        store.remove("pack:GA:1:seed")?;
        Ok(())
    }

    #[test]
    fn test_survives_reopen() -> Result<()> {
        let temp_dir = TempDir::new()?;
        FsStore::new(temp_dir.path())?.set("manifest:v1", &json!({ "ok": true }))?;

        let reopened = FsStore::new(temp_dir.path())?;
        assert_eq!(reopened.get("manifest:v1"), Some(json!({ "ok": true })));
        Ok(())
    }

    #[test]
    fn test_malformed_entry_reads_as_absent() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = FsStore::new(temp_dir.path())?;
        std::fs::write(entry_path(temp_dir.path(), "pack:GA:1:seed"), b"{not json")?;

        assert_eq!(store.get("pack:GA:1:seed"), None);
        // still listed, so it can be cleared
        assert_eq!(store.keys("pack:GA:"), vec!["pack:GA:1:seed".to_string()]);
        Ok(())
    }

    #[test]
    fn test_keys_by_prefix() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let store = FsStore::new(temp_dir.path())?;
        store.set("pack:GA:1:seed", &json!({}))?;
        store.set("pack:GA:1:2026.02.20", &json!({}))?;
        store.set("pack:GAX:1:seed", &json!({}))?;
        store.set("manifest:v1", &json!({}))?;
        std::fs::write(temp_dir.path().join("stray.txt"), b"x")?;

        assert_eq!(
            store.keys("pack:GA:"),
            vec!["pack:GA:1:2026.02.20".to_string(), "pack:GA:1:seed".to_string()]
        );
        assert_eq!(store.keys("").len(), 4);
        Ok(())
    }
}
