//! Publishing workflow: drafts, publish/unpublish and review requests.
//!
//! Every operation checks the acting user's permissions before touching
//! storage, so a denied action leaves nothing behind. Each state change of
//! a record is committed to its version history.

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, ContentRecord, PublishStatus, ReviewRequest, ReviewState};
use crate::permissions::{Action, ensure};
use crate::publishing::{RuleSet, ValidationResult, generate_slug};
use crate::settings::SettingsProvider;
use crate::storage::{Collection, ContentStore, Repository};
use crate::versions::VersionService;

/// Result of a publish attempt.
#[derive(Debug, Clone)]
pub enum PublishOutcome<T> {
    /// The record passed validation and is now published.
    Published { record: T, warnings: Vec<String> },
    /// Validation failed; the record was not changed.
    Rejected(ValidationResult),
}

impl<T> PublishOutcome<T> {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// Result of approving a review request.
#[derive(Debug, Clone)]
pub struct ReviewDecision<T> {
    pub review: ReviewRequest,
    pub outcome: PublishOutcome<T>,
}

/// Workflow service for one record type.
pub struct PublishService<T> {
    inner: Arc<PublishServiceInner<T>>,
}

struct PublishServiceInner<T> {
    store: Arc<dyn ContentStore>,
    records: Repository<T>,
    versions: VersionService,
    settings: Arc<SettingsProvider>,
}

impl<T> Clone for PublishService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ContentRecord> PublishService<T> {
    /// Create a new publish service.
    pub fn new(store: Arc<dyn ContentStore>, settings: Arc<SettingsProvider>) -> Self {
        Self {
            inner: Arc::new(PublishServiceInner {
                records: Repository::new(Arc::clone(&store)),
                versions: VersionService::new(Arc::clone(&store)),
                store,
                settings,
            }),
        }
    }

    pub fn records(&self) -> &Repository<T> {
        &self.inner.records
    }

    pub fn versions(&self) -> &VersionService {
        &self.inner.versions
    }

    /// Save edits to a record and commit a version.
    ///
    /// An empty slug is filled from the title when auto-slug is on. Saving
    /// never changes publication state: the stored record's status and
    /// publication time are kept, and a new record starts as a draft. A
    /// published record whose edits no longer pass validation drops back to
    /// draft.
    pub async fn save_draft(
        &self,
        user: &AuthUser,
        mut record: T,
        change_summary: Option<&str>,
    ) -> AppResult<T> {
        ensure(user, Action::Edit)?;
        let workflow = self.inner.settings.workflow();
        let previous = self.inner.records.get(record.id()).await?;

        if workflow.auto_slug && record.publishing().slug.is_empty() {
            let slug = generate_slug(record.title());
            record.publishing_mut().slug = slug;
        }

        let (status, published_at) = previous
            .as_ref()
            .map_or((PublishStatus::Draft, None), |stored| {
                (stored.publishing().status, stored.publishing().published_at)
            });
        if record.publishing().status != status {
            warn!(
                content_id = %record.id(),
                collection = %T::COLLECTION,
                requested = record.publishing().status.as_str(),
                kept = status.as_str(),
                "saving does not change publication status"
            );
        }
        let publishing = record.publishing_mut();
        publishing.status = status;
        publishing.published_at = published_at;

        if record.publishing().is_published()
            && !workflow.rule_set.validate(record.publishing()).valid
        {
            warn!(
                content_id = %record.id(),
                collection = %T::COLLECTION,
                "published record no longer valid, reverting to draft"
            );
            record.publishing_mut().mark_draft();
        }

        record.touch(Utc::now());
        let version = self
            .inner
            .versions
            .save_and_commit(
                &self.inner.records,
                &record,
                previous.as_ref(),
                change_summary.unwrap_or("Saved draft"),
                user,
            )
            .await?;

        info!(
            content_id = %record.id(),
            collection = %T::COLLECTION,
            version = version.version_number,
            user_id = %user.id,
            "draft saved"
        );
        Ok(record)
    }

    /// Publish a stored record.
    ///
    /// With `require_review` on, only review approvers may publish directly.
    pub async fn publish(&self, user: &AuthUser, id: Uuid) -> AppResult<PublishOutcome<T>> {
        let workflow = self.inner.settings.workflow();
        ensure(user, workflow.publish_action())?;

        let record = self.inner.records.require(id).await?;
        self.publish_record(user, record, workflow.rule_set, "Published")
            .await
    }

    /// Validate and publish `record`. An already published record is
    /// returned as is, keeping its publication time.
    async fn publish_record(
        &self,
        user: &AuthUser,
        record: T,
        rule_set: RuleSet,
        change_summary: &str,
    ) -> AppResult<PublishOutcome<T>> {
        let result = rule_set.validate(record.publishing());
        if !result.valid {
            info!(
                content_id = %record.id(),
                collection = %T::COLLECTION,
                errors = result.errors.len(),
                "publish rejected by validation"
            );
            return Ok(PublishOutcome::Rejected(result));
        }
        if record.publishing().is_published() {
            debug!(content_id = %record.id(), "already published");
            return Ok(PublishOutcome::Published {
                record,
                warnings: result.warnings,
            });
        }

        let now = Utc::now();
        let mut published = record.clone();
        published.publishing_mut().mark_published(now);
        published.touch(now);
        self.inner
            .versions
            .save_and_commit(
                &self.inner.records,
                &published,
                Some(&record),
                change_summary,
                user,
            )
            .await?;

        info!(
            content_id = %published.id(),
            collection = %T::COLLECTION,
            slug = %published.publishing().slug,
            user_id = %user.id,
            "content published"
        );
        Ok(PublishOutcome::Published {
            record: published,
            warnings: result.warnings,
        })
    }

    /// Return a published record to draft.
    pub async fn unpublish(&self, user: &AuthUser, id: Uuid) -> AppResult<T> {
        ensure(user, Action::Publish)?;

        let stored = self.inner.records.require(id).await?;
        if !stored.publishing().is_published() {
            return Ok(stored);
        }

        let mut record = stored.clone();
        record.publishing_mut().mark_draft();
        record.touch(Utc::now());
        self.inner
            .versions
            .save_and_commit(&self.inner.records, &record, Some(&stored), "Unpublished", user)
            .await?;

        info!(content_id = %id, collection = %T::COLLECTION, user_id = %user.id, "content unpublished");
        Ok(record)
    }

    /// Delete a record together with its version history and reviews.
    pub async fn delete(&self, user: &AuthUser, id: Uuid) -> AppResult<bool> {
        ensure(user, Action::Delete)?;

        if !self.inner.records.delete(id).await? {
            return Ok(false);
        }
        let versions = self.inner.versions.delete_history(id).await?;
        for review in self.reviews_for(id).await? {
            self.inner
                .store
                .delete(Collection::Reviews, &review.id.to_string())
                .await?;
        }

        info!(
            content_id = %id,
            collection = %T::COLLECTION,
            versions,
            user_id = %user.id,
            "content deleted"
        );
        Ok(true)
    }

    /// Open a review request for a record.
    ///
    /// A record has at most one pending review; submitting again returns
    /// the open request.
    pub async fn submit_for_review(&self, user: &AuthUser, id: Uuid) -> AppResult<ReviewRequest> {
        ensure(user, Action::SubmitReview)?;
        self.inner.records.require(id).await?;

        if let Some(open) = self
            .reviews_for(id)
            .await?
            .into_iter()
            .find(ReviewRequest::is_pending)
        {
            return Ok(open);
        }

        let review = ReviewRequest::pending(T::COLLECTION, id, user.id);
        self.save_review(&review).await?;

        info!(
            review_id = %review.id,
            content_id = %id,
            collection = %T::COLLECTION,
            user_id = %user.id,
            "review requested"
        );
        Ok(review)
    }

    /// Approve a pending review and publish its record.
    ///
    /// The review is only marked approved when the record passes
    /// validation; otherwise it stays pending and the validation result is
    /// returned.
    pub async fn approve_review(
        &self,
        user: &AuthUser,
        review_id: Uuid,
    ) -> AppResult<ReviewDecision<T>> {
        ensure(user, Action::ApproveReview)?;

        let mut review = self.require_pending(review_id).await?;
        let record = self.inner.records.require(review.content_id).await?;
        let rule_set = self.inner.settings.workflow().rule_set;

        let outcome = self
            .publish_record(user, record, rule_set, "Published after review")
            .await?;
        if outcome.is_published() {
            review.close(ReviewState::Approved, user.id, None);
            self.save_review(&review).await?;
            info!(review_id = %review_id, user_id = %user.id, "review approved");
        }

        Ok(ReviewDecision { review, outcome })
    }

    /// Reject a pending review. The record stays a draft.
    pub async fn reject_review(
        &self,
        user: &AuthUser,
        review_id: Uuid,
        note: Option<String>,
    ) -> AppResult<ReviewRequest> {
        ensure(user, Action::ApproveReview)?;

        let mut review = self.require_pending(review_id).await?;
        review.close(ReviewState::Rejected, user.id, note);
        self.save_review(&review).await?;

        info!(review_id = %review_id, user_id = %user.id, "review rejected");
        Ok(review)
    }

    /// Pending review requests for this record type, oldest first.
    pub async fn pending_reviews(&self) -> AppResult<Vec<ReviewRequest>> {
        let mut pending: Vec<ReviewRequest> = self
            .load_reviews()
            .await?
            .into_iter()
            .filter(|r| r.collection == T::COLLECTION && r.is_pending())
            .collect();
        pending.sort_by_key(|r| r.submitted_at);
        Ok(pending)
    }

    async fn load_reviews(&self) -> AppResult<Vec<ReviewRequest>> {
        let documents = self.inner.store.list(Collection::Reviews).await?;
        let mut reviews = Vec::with_capacity(documents.len());
        for document in documents {
            let review = serde_json::from_value(document).context("failed to decode review")?;
            reviews.push(review);
        }
        Ok(reviews)
    }

    async fn reviews_for(&self, content_id: Uuid) -> AppResult<Vec<ReviewRequest>> {
        Ok(self
            .load_reviews()
            .await?
            .into_iter()
            .filter(|r| r.collection == T::COLLECTION && r.content_id == content_id)
            .collect())
    }

    async fn require_pending(&self, review_id: Uuid) -> AppResult<ReviewRequest> {
        let document = self
            .inner
            .store
            .get(Collection::Reviews, &review_id.to_string())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("review {review_id}")))?;
        let review: ReviewRequest =
            serde_json::from_value(document).context("failed to decode review")?;

        if review.collection != T::COLLECTION {
            return Err(AppError::BadRequest(format!(
                "review {review_id} belongs to {}",
                review.collection
            )));
        }
        if !review.is_pending() {
            return Err(AppError::Conflict(format!(
                "review {review_id} is already closed"
            )));
        }
        Ok(review)
    }

    async fn save_review(&self, review: &ReviewRequest) -> AppResult<()> {
        let document = serde_json::to_value(review).context("failed to encode review")?;
        self.inner
            .store
            .upsert(Collection::Reviews, &review.id.to_string(), document)
            .await?;
        Ok(())
    }
}
