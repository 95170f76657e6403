//! Content storage abstraction layer.
//!
//! All record reads and writes go through [`ContentStore`]. The console
//! never branches on which backend answered: the backend is picked once at
//! startup (see [`crate::state::AppState`]) and handed around as
//! `Arc<dyn ContentStore>`.
//!
//! # Backends
//!
//! - [`MemoryStore`] - ephemeral, used by tests and `STORAGE_BACKEND=memory`
//! - [`LocalStore`] - one JSON file per collection; the fallback when no
//!   database is configured or reachable
//! - [`PgStore`] - PostgreSQL JSONB table
//!
//! Documents are plain JSON values keyed by collection and id. The typed
//! [`Repository`] wrapper converts them to and from [`ContentRecord`]s.

mod local;
mod memory;
mod postgres;

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

pub use local::LocalStore;
pub use memory::MemoryStore;
#[cfg(test)]
pub(crate) use memory::FailingStore;
pub use postgres::PgStore;

use crate::error::{AppError, AppResult};
use crate::models::ContentRecord;

/// Named collections in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Lexicon,
    GrammarRules,
    Scenarios,
    ContentItems,
    ContentVersions,
    Reviews,
}

impl Collection {
    /// Every collection, in a stable order.
    pub const ALL: [Collection; 6] = [
        Collection::Lexicon,
        Collection::GrammarRules,
        Collection::Scenarios,
        Collection::ContentItems,
        Collection::ContentVersions,
        Collection::Reviews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Lexicon => "lexicon",
            Collection::GrammarRules => "grammar_rules",
            Collection::Scenarios => "scenarios",
            Collection::ContentItems => "content_items",
            Collection::ContentVersions => "content_versions",
            Collection::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexicon" => Ok(Collection::Lexicon),
            "grammar" | "grammar_rules" => Ok(Collection::GrammarRules),
            "scenario" | "scenarios" => Ok(Collection::Scenarios),
            "content" | "content_items" => Ok(Collection::ContentItems),
            "content_versions" => Ok(Collection::ContentVersions),
            "reviews" => Ok(Collection::Reviews),
            other => Err(AppError::BadRequest(format!("unknown collection '{other}'"))),
        }
    }
}

/// The core trait for document storage.
///
/// Keep the interface small: every backend must be able to serve it, and
/// callers rely on nothing else.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Load a document by collection and id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>>;

    /// List all documents of a collection, ordered by id.
    async fn list(&self, collection: Collection) -> Result<Vec<Value>>;

    /// List the documents of a collection whose top-level string `field`
    /// equals `value`, ordered by id.
    ///
    /// The default scans [`list`](Self::list); backends with an index
    /// should filter at the source.
    async fn list_by(
        &self,
        collection: Collection,
        field: &str,
        value: &str,
    ) -> Result<Vec<Value>> {
        Ok(self
            .list(collection)
            .await?
            .into_iter()
            .filter(|d| d.get(field).and_then(Value::as_str) == Some(value))
            .collect())
    }

    /// Insert or replace a document. Last write wins.
    async fn upsert(&self, collection: Collection, id: &str, document: Value) -> Result<()>;

    /// Delete a document. Returns `true` if it existed.
    async fn delete(&self, collection: Collection, id: &str) -> Result<bool>;

    /// Check if a document exists.
    async fn exists(&self, collection: Collection, id: &str) -> Result<bool> {
        Ok(self.get(collection, id).await?.is_some())
    }
}

/// Typed access to the collection of one record type.
pub struct Repository<T> {
    store: Arc<dyn ContentStore>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: ContentRecord> Repository<T> {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Load a record by id.
    pub async fn get(&self, id: Uuid) -> AppResult<Option<T>> {
        let Some(document) = self.store.get(T::COLLECTION, &id.to_string()).await? else {
            return Ok(None);
        };

        let record = serde_json::from_value(document)
            .with_context(|| format!("failed to decode {} record {id}", T::COLLECTION))?;
        Ok(Some(record))
    }

    /// Load a record by id, failing with `NotFound` when absent.
    pub async fn require(&self, id: Uuid) -> AppResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} record {id}", T::COLLECTION)))
    }

    /// List all records of the collection.
    pub async fn list(&self) -> AppResult<Vec<T>> {
        let documents = self.store.list(T::COLLECTION).await?;
        let mut records = Vec::with_capacity(documents.len());
        for document in documents {
            let record = serde_json::from_value(document)
                .with_context(|| format!("failed to decode {} record", T::COLLECTION))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Find a record by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<T>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|r| r.publishing().slug == slug))
    }

    /// Insert or replace a record.
    ///
    /// Non-empty slugs must be unique within the collection.
    pub async fn save(&self, record: &T) -> AppResult<()> {
        let slug = &record.publishing().slug;
        if !slug.is_empty() {
            if let Some(other) = self.find_by_slug(slug).await? {
                if other.id() != record.id() {
                    return Err(AppError::Conflict(format!(
                        "slug '{slug}' is already used by {} record {}",
                        T::COLLECTION,
                        other.id()
                    )));
                }
            }
        }

        let document = serde_json::to_value(record)
            .with_context(|| format!("failed to encode {} record", T::COLLECTION))?;
        self.store
            .upsert(T::COLLECTION, &record.id().to_string(), document)
            .await?;

        debug!(collection = %T::COLLECTION, id = %record.id(), "record saved");
        Ok(())
    }

    /// Delete a record. Returns `true` if it existed.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.store.delete(T::COLLECTION, &id.to_string()).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::LexiconEntry;

    fn repo() -> Repository<LexiconEntry> {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn collection_names_round_trip() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>().unwrap(), collection);
        }
        assert_eq!("grammar".parse::<Collection>().unwrap(), Collection::GrammarRules);
        assert!("users".parse::<Collection>().is_err());
    }

    #[tokio::test]
    async fn save_get_delete() {
        let repo = repo();
        let entry = LexiconEntry::new("是", "to be");

        repo.save(&entry).await.unwrap();
        assert_eq!(repo.get(entry.id).await.unwrap(), Some(entry.clone()));
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert!(repo.delete(entry.id).await.unwrap());
        assert!(repo.get(entry.id).await.unwrap().is_none());
        assert!(!repo.delete(entry.id).await.unwrap());
    }

    #[tokio::test]
    async fn require_reports_not_found() {
        let err = repo().require(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_slug_is_a_conflict() {
        let repo = repo();
        let mut first = LexiconEntry::new("是", "to be");
        first.publishing.slug = "shi".to_string();
        repo.save(&first).await.unwrap();

        // Re-saving the same record is fine.
        repo.save(&first).await.unwrap();

        let mut second = LexiconEntry::new("事", "matter");
        second.publishing.slug = "shi".to_string();
        let err = repo.save(&second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Empty slugs never conflict.
        let mut third = LexiconEntry::new("试", "try");
        third.publishing.slug.clear();
        let mut fourth = LexiconEntry::new("市", "city");
        fourth.publishing.slug.clear();
        repo.save(&third).await.unwrap();
        repo.save(&fourth).await.unwrap();
    }
}
