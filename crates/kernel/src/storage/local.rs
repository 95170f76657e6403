//! Local JSON-file document store.
//!
//! Each collection lives in `{dir}/{collection}.json` as an object of
//! `id -> document`. Everything is loaded at open time; every mutation
//! rewrites the affected collection file through a temp file + rename, and
//! the cache only takes the change once the file is replaced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::memory::MemoryStore;
use super::{Collection, ContentStore};

/// File-backed store used when no database is available.
pub struct LocalStore {
    dir: PathBuf,
    cache: MemoryStore,
    /// Serializes file writes.
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Open (or create) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;

        let cache = MemoryStore::new();
        let mut total = 0;
        for collection in Collection::ALL {
            let path = collection_path(&dir, collection);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                continue;
            }

            let raw = tokio::fs::read(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let documents: BTreeMap<String, Value> = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            total += documents.len();
            cache.replace(collection, documents);
        }

        info!(dir = %dir.display(), documents = total, "local store opened");

        Ok(Self {
            dir,
            cache,
            write_lock: Mutex::new(()),
        })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `documents` as the new contents of a collection file.
    async fn flush(
        &self,
        collection: Collection,
        documents: &BTreeMap<String, Value>,
    ) -> Result<()> {
        let json = serde_json::to_vec_pretty(documents)
            .with_context(|| format!("failed to encode collection {collection}"))?;

        let path = collection_path(&self.dir, collection);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;

        debug!(collection = %collection, documents = documents.len(), "collection flushed");
        Ok(())
    }
}

fn collection_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{collection}.json"))
}

#[async_trait]
impl ContentStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        self.cache.get(collection, id).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        self.cache.list(collection).await
    }

    async fn upsert(&self, collection: Collection, id: &str, document: Value) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.cache.snapshot(collection);
        documents.insert(id.to_string(), document);
        self.flush(collection, &documents).await?;
        self.cache.replace(collection, documents);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut documents = self.cache.snapshot(collection);
        if documents.remove(id).is_none() {
            return Ok(false);
        }
        self.flush(collection, &documents).await?;
        self.cache.replace(collection, documents);
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use lingua_test_utils::TestDir;
    use serde_json::json;

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = TestDir::new("local_store_reopen");

        let store = LocalStore::open(dir.to_path_buf()).await.unwrap();
        store
            .upsert(Collection::Lexicon, "a", json!({"word": "是"}))
            .await
            .unwrap();
        store
            .upsert(Collection::Lexicon, "b", json!({"word": "有"}))
            .await
            .unwrap();
        assert!(store.delete(Collection::Lexicon, "b").await.unwrap());
        drop(store);

        let reopened = LocalStore::open(dir.to_path_buf()).await.unwrap();
        assert_eq!(
            reopened.get(Collection::Lexicon, "a").await.unwrap(),
            Some(json!({"word": "是"}))
        );
        assert!(reopened.get(Collection::Lexicon, "b").await.unwrap().is_none());
        assert!(dir.join("lexicon.json").exists());
        assert!(!dir.join("scenarios.json").exists());
    }

    #[tokio::test]
    async fn failed_write_is_not_visible() {
        let dir = TestDir::new("local_store_failed_write");
        let store = LocalStore::open(dir.to_path_buf()).await.unwrap();
        store
            .upsert(Collection::Scenarios, "kept", json!({"title": "Triage"}))
            .await
            .unwrap();

        // A non-empty directory where the collection file belongs makes the
        // rename fail.
        std::fs::create_dir_all(dir.join("lexicon.json").join("blocker")).unwrap();
        assert!(
            store
                .upsert(Collection::Lexicon, "a", json!({"word": "是"}))
                .await
                .is_err()
        );
        assert!(store.get(Collection::Lexicon, "a").await.unwrap().is_none());
        assert!(store.list(Collection::Lexicon).await.unwrap().is_empty());

        std::fs::remove_file(dir.join("scenarios.json")).unwrap();
        std::fs::create_dir_all(dir.join("scenarios.json").join("blocker")).unwrap();
        assert!(store.delete(Collection::Scenarios, "kept").await.is_err());
        assert_eq!(
            store.get(Collection::Scenarios, "kept").await.unwrap(),
            Some(json!({"title": "Triage"}))
        );
    }

    #[tokio::test]
    async fn corrupt_file_fails_to_open() {
        let dir = TestDir::new("local_store_corrupt");
        std::fs::write(dir.join("reviews.json"), "not json").unwrap();
        assert!(LocalStore::open(dir.to_path_buf()).await.is_err());
    }
}
