//! Version history service.
//!
//! Versions are stored in the `content_versions` collection and are only
//! ever appended. Rollback copies an old version forward instead of
//! rewinding history.

use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::diff::{VersionComparison, compare_versions};
use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, ContentRecord, ContentVersion};
use crate::permissions::{Action, ensure};
use crate::storage::{Collection, ContentStore, Repository};

/// Result of a rollback.
#[derive(Debug, Clone)]
pub struct RollbackOutcome<T> {
    /// The record after restoring the target's fields.
    pub record: T,
    /// The new version copied from the target.
    pub version: ContentVersion,
    /// Snapshot of unsaved changes taken before restoring, if there were any.
    pub snapshot: Option<ContentVersion>,
}

/// Service for content version history.
#[derive(Clone)]
pub struct VersionService {
    store: Arc<dyn ContentStore>,
}

impl VersionService {
    /// Create a new version service.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// All versions of a record, oldest first.
    pub async fn history(&self, content_id: Uuid) -> AppResult<Vec<ContentVersion>> {
        let documents = self
            .store
            .list_by(
                Collection::ContentVersions,
                "content_id",
                &content_id.to_string(),
            )
            .await?;

        let mut versions = Vec::with_capacity(documents.len());
        for document in documents {
            let version: ContentVersion =
                serde_json::from_value(document).context("failed to decode content version")?;
            versions.push(version);
        }
        versions.sort_by_key(|v| v.version_number);
        Ok(versions)
    }

    /// Load a version by id.
    pub async fn get(&self, version_id: Uuid) -> AppResult<Option<ContentVersion>> {
        let Some(document) = self
            .store
            .get(Collection::ContentVersions, &version_id.to_string())
            .await?
        else {
            return Ok(None);
        };

        let version = serde_json::from_value(document)
            .with_context(|| format!("failed to decode content version {version_id}"))?;
        Ok(Some(version))
    }

    /// Load a version by id, failing with `NotFound` when absent.
    pub async fn require(&self, version_id: Uuid) -> AppResult<ContentVersion> {
        self.get(version_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("content version {version_id}")))
    }

    /// The highest-numbered version of a record.
    pub async fn current(&self, content_id: Uuid) -> AppResult<Option<ContentVersion>> {
        Ok(self.history(content_id).await?.pop())
    }

    /// Build the next version of `record` without storing it.
    pub async fn prepare<T: ContentRecord>(
        &self,
        record: &T,
        change_summary: &str,
        user: &AuthUser,
    ) -> AppResult<ContentVersion> {
        let next = self
            .current(record.id())
            .await?
            .map_or(1, |v| v.version_number + 1);

        let version = ContentVersion::snapshot(record, next, change_summary, user.id)
            .context("failed to snapshot record")?;
        Ok(version)
    }

    async fn append(&self, version: &ContentVersion) -> AppResult<()> {
        let document = serde_json::to_value(version).context("failed to encode version")?;
        self.store
            .upsert(Collection::ContentVersions, &version.id.to_string(), document)
            .await?;

        info!(
            content_id = %version.content_id,
            collection = %version.collection,
            version = version.version_number,
            "content version committed"
        );
        Ok(())
    }

    /// Append a snapshot of `record` as the next version.
    pub async fn commit<T: ContentRecord>(
        &self,
        record: &T,
        change_summary: &str,
        user: &AuthUser,
    ) -> AppResult<ContentVersion> {
        let version = self.prepare(record, change_summary, user).await?;
        self.append(&version).await?;
        Ok(version)
    }

    /// Save `record` and append it as the next version.
    ///
    /// The snapshot is built before anything is written. When the version
    /// cannot be stored the record write is undone: `previous` is written
    /// back, or a new record is removed again.
    pub async fn save_and_commit<T: ContentRecord>(
        &self,
        repo: &Repository<T>,
        record: &T,
        previous: Option<&T>,
        change_summary: &str,
        user: &AuthUser,
    ) -> AppResult<ContentVersion> {
        let version = self.prepare(record, change_summary, user).await?;
        repo.save(record).await?;

        if let Err(e) = self.append(&version).await {
            let undo = match previous {
                Some(previous) => repo.save(previous).await,
                None => repo.delete(record.id()).await.map(|_| ()),
            };
            if let Err(undo_err) = undo {
                error!(
                    content_id = %record.id(),
                    collection = %T::COLLECTION,
                    error = %undo_err,
                    "record saved without a version"
                );
                return Err(AppError::Internal(anyhow!(
                    "{} record {} was saved but version {} was not ({e}); undo failed: {undo_err}",
                    T::COLLECTION,
                    record.id(),
                    version.version_number
                )));
            }
            return Err(e);
        }
        Ok(version)
    }

    /// Compare two versions of the same record, older first.
    pub async fn compare(&self, first: Uuid, second: Uuid) -> AppResult<VersionComparison> {
        let a = self.require(first).await?;
        let b = self.require(second).await?;

        if a.content_id != b.content_id {
            return Err(AppError::BadRequest(
                "versions belong to different records".to_string(),
            ));
        }

        let (older, newer) = if a.version_number <= b.version_number {
            (a, b)
        } else {
            (b, a)
        };
        Ok(compare_versions(&older, &newer))
    }

    /// Restore a record to an earlier version.
    ///
    /// The target version is left untouched. If the live record has changes
    /// not captured by its latest version, those are committed first so no
    /// edit is lost. The target's fields are then written back to the record
    /// and appended as a new version.
    pub async fn rollback_to_version<T: ContentRecord>(
        &self,
        user: &AuthUser,
        content_id: Uuid,
        target_version_id: Uuid,
    ) -> AppResult<RollbackOutcome<T>> {
        ensure(user, Action::Edit)?;

        let target = self.require(target_version_id).await?;
        if target.content_id != content_id || target.collection != T::COLLECTION {
            return Err(AppError::BadRequest(
                "version does not belong to this record".to_string(),
            ));
        }

        let repo = Repository::<T>::new(Arc::clone(&self.store));
        let current = repo.require(content_id).await?;

        let captured = match self.current(content_id).await? {
            Some(latest) => latest
                .matches(&current)
                .context("failed to compare record with latest version")?,
            None => false,
        };

        let snapshot = if captured {
            None
        } else {
            let summary = format!(
                "Snapshot before rollback to version {}",
                target.version_number
            );
            Some(self.commit(&current, &summary, user).await?)
        };

        let mut restored = target
            .restore_into(&current)
            .context("failed to restore record from version")?;
        restored.touch(Utc::now());

        let summary = format!("Rolled back to version {}", target.version_number);
        let version = self
            .save_and_commit(&repo, &restored, Some(&current), &summary, user)
            .await?;

        info!(
            content_id = %content_id,
            target = target.version_number,
            new_version = version.version_number,
            user_id = %user.id,
            "content rolled back"
        );

        Ok(RollbackOutcome {
            record: restored,
            version,
            snapshot,
        })
    }

    /// Remove every version of a record. Returns the number removed.
    pub async fn delete_history(&self, content_id: Uuid) -> AppResult<usize> {
        let versions = self.history(content_id).await?;
        for version in &versions {
            self.store
                .delete(Collection::ContentVersions, &version.id.to_string())
                .await?;
        }
        Ok(versions.len())
    }
}
