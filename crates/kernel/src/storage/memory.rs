//! In-memory document store.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::{Collection, ContentStore};

/// Ephemeral store backed by a `DashMap` of ordered collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<Collection, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of one collection's documents.
    pub(super) fn snapshot(&self, collection: Collection) -> BTreeMap<String, Value> {
        self.collections
            .get(&collection)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Replace one collection's documents wholesale.
    pub(super) fn replace(&self, collection: Collection, documents: BTreeMap<String, Value>) {
        self.collections.insert(collection, documents);
    }

    /// Number of documents in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        self.collections.get(&collection).map_or(0, |c| c.len())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        Ok(self
            .collections
            .get(&collection)
            .and_then(|c| c.get(id).cloned()))
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        Ok(self
            .collections
            .get(&collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, collection: Collection, id: &str, document: Value) -> Result<()> {
        self.collections
            .entry(collection)
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self
            .collections
            .get_mut(&collection)
            .is_some_and(|mut c| c.remove(id).is_some()))
    }
}

/// Memory store whose writes to one collection always fail.
#[cfg(test)]
pub(crate) struct FailingStore {
    pub inner: MemoryStore,
    pub failing: Collection,
}

#[cfg(test)]
impl FailingStore {
    pub fn new(failing: Collection) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ContentStore for FailingStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        self.inner.list(collection).await
    }

    async fn upsert(&self, collection: Collection, id: &str, document: Value) -> Result<()> {
        if collection == self.failing {
            anyhow::bail!("write to {collection} failed");
        }
        self.inner.upsert(collection, id, document).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
        self.inner.delete(collection, id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .upsert(Collection::Lexicon, "a", json!({"word": "是"}))
            .await
            .unwrap();

        assert!(store.exists(Collection::Lexicon, "a").await.unwrap());
        assert!(!store.exists(Collection::Scenarios, "a").await.unwrap());
        assert_eq!(store.len(Collection::Lexicon), 1);
        assert_eq!(store.len(Collection::Scenarios), 0);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store
                .upsert(Collection::Reviews, id, json!({"id": id}))
                .await
                .unwrap();
        }

        let ids: Vec<Value> = store
            .list(Collection::Reviews)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn list_by_matches_string_field() {
        let store = MemoryStore::new();
        store
            .upsert(Collection::ContentVersions, "1", json!({"content_id": "x", "n": 1}))
            .await
            .unwrap();
        store
            .upsert(Collection::ContentVersions, "2", json!({"content_id": "y", "n": 2}))
            .await
            .unwrap();
        store
            .upsert(Collection::ContentVersions, "3", json!({"content_id": "x", "n": 3}))
            .await
            .unwrap();

        let found = store
            .list_by(Collection::ContentVersions, "content_id", "x")
            .await
            .unwrap();
        let numbers: Vec<Value> = found.into_iter().map(|d| d["n"].clone()).collect();
        assert_eq!(numbers, vec![json!(1), json!(3)]);
        assert!(
            store
                .list_by(Collection::ContentVersions, "n", "1")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn upsert_replaces() {
        let store = MemoryStore::new();
        store.upsert(Collection::Lexicon, "a", json!(1)).await.unwrap();
        store.upsert(Collection::Lexicon, "a", json!(2)).await.unwrap();
        assert_eq!(store.get(Collection::Lexicon, "a").await.unwrap(), Some(json!(2)));
        assert!(store.delete(Collection::Lexicon, "a").await.unwrap());
        assert!(!store.delete(Collection::Lexicon, "a").await.unwrap());
    }
}
