//! Content version snapshots.
//!
//! A version is an immutable copy of a record's field values. Versions are
//! appended on every committed edit and are never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentRecord;
use super::publishing::PublishStatus;
use crate::storage::Collection;

/// Record keys that are not part of the versioned content body.
const UNVERSIONED_KEYS: &[&str] = &["id", "publishing", "created_at", "updated_at"];

/// Content version record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVersion {
    /// Unique identifier (UUIDv7).
    pub id: Uuid,

    /// Record this version belongs to.
    pub content_id: Uuid,

    /// Collection of the record.
    pub collection: Collection,

    /// Sequential number, starting at 1 per content id.
    pub version_number: u32,

    pub title: String,
    pub slug: String,
    pub status: PublishStatus,

    /// SEO block at this version.
    pub seo_json: serde_json::Value,

    /// GEO block at this version.
    pub geo_json: serde_json::Value,

    /// Type-specific content fields at this version.
    #[serde(default)]
    pub content_json: serde_json::Value,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Revision log message.
    #[serde(default)]
    pub change_summary: String,

    pub created_at: DateTime<Utc>,
    pub created_by: Uuid,
}

impl ContentVersion {
    /// Snapshot a record as the given version number.
    pub fn snapshot<T: ContentRecord>(
        record: &T,
        version_number: u32,
        change_summary: impl Into<String>,
        created_by: Uuid,
    ) -> serde_json::Result<Self> {
        let publishing = record.publishing();
        Ok(Self {
            id: Uuid::now_v7(),
            content_id: record.id(),
            collection: T::COLLECTION,
            version_number,
            title: record.title().to_string(),
            slug: publishing.slug.clone(),
            status: publishing.status,
            seo_json: serde_json::to_value(&publishing.seo)?,
            geo_json: serde_json::to_value(&publishing.geo)?,
            content_json: content_fields(record)?,
            published_at: publishing.published_at,
            change_summary: change_summary.into(),
            created_at: Utc::now(),
            created_by,
        })
    }

    /// Check whether the record's current fields equal this snapshot.
    pub fn matches<T: ContentRecord>(&self, record: &T) -> serde_json::Result<bool> {
        let publishing = record.publishing();
        Ok(self.title == record.title()
            && self.slug == publishing.slug
            && self.status == publishing.status
            && self.published_at == publishing.published_at
            && self.seo_json == serde_json::to_value(&publishing.seo)?
            && self.geo_json == serde_json::to_value(&publishing.geo)?
            && self.content_json == content_fields(record)?)
    }

    /// Write this version's fields back into a record.
    ///
    /// Identity, timestamps and the stored JSON-LD payload of `current` are kept.
    pub fn restore_into<T: ContentRecord>(&self, current: &T) -> serde_json::Result<T> {
        let mut value = serde_json::to_value(current)?;
        if let (Some(target), Some(fields)) = (value.as_object_mut(), self.content_json.as_object())
        {
            for (key, field) in fields {
                target.insert(key.clone(), field.clone());
            }
        }

        let mut restored: T = serde_json::from_value(value)?;
        let publishing = restored.publishing_mut();
        publishing.slug = self.slug.clone();
        publishing.status = self.status;
        publishing.published_at = self.published_at;
        publishing.seo = serde_json::from_value(self.seo_json.clone())?;
        publishing.geo = serde_json::from_value(self.geo_json.clone())?;
        Ok(restored)
    }
}

/// Serialize a record's content fields, without identity and publishing data.
pub(crate) fn content_fields<T: ContentRecord>(record: &T) -> serde_json::Result<serde_json::Value> {
    let mut value = serde_json::to_value(record)?;
    if let Some(map) = value.as_object_mut() {
        for key in UNVERSIONED_KEYS {
            map.remove(*key);
        }
    }
    Ok(value)
}
