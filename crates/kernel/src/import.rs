//! Bulk import of content records.
//!
//! A batch never aborts on a bad item: each failure is counted and
//! described in the [`ImportSummary`], and the remaining items are still
//! imported.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AuthUser, ContentItem, ContentRecord, GrammarRule, LexiconEntry, Scenario};
use crate::permissions::{Action, can, ensure};
use crate::publishing::generate_slug;
use crate::settings::SettingsProvider;
use crate::storage::{Collection, ContentStore, Repository};
use crate::versions::VersionService;

/// Partial-success report of an import batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportSummary {
    fn record_failure(&mut self, index: usize, message: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(format!("item {index}: {message}"));
    }
}

/// Parse an import file: a YAML list for `.yaml`/`.yml`, a JSON array otherwise.
pub fn parse_documents(path: &Path, raw: &str) -> AppResult<Vec<Value>> {
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yml::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("invalid YAML in {}: {e}", path.display())))
    } else {
        serde_json::from_str(raw)
            .map_err(|e| AppError::BadRequest(format!("invalid JSON in {}: {e}", path.display())))
    }
}

/// Fill identity and timestamps the source data usually lacks.
fn prepare_document(document: Value) -> Result<Value, String> {
    let Value::Object(mut map) = document else {
        return Err("expected an object".to_string());
    };

    let now = json!(Utc::now());
    map.entry("id").or_insert_with(|| json!(Uuid::now_v7()));
    map.entry("created_at").or_insert_with(|| now.clone());
    map.entry("updated_at").or_insert(now);
    Ok(Value::Object(map))
}

/// Imports documents into the store.
#[derive(Clone)]
pub struct Importer {
    store: Arc<dyn ContentStore>,
    versions: VersionService,
    settings: Arc<SettingsProvider>,
}

impl Importer {
    pub fn new(store: Arc<dyn ContentStore>, settings: Arc<SettingsProvider>) -> Self {
        Self {
            versions: VersionService::new(Arc::clone(&store)),
            store,
            settings,
        }
    }

    /// Import documents as records of type `T`.
    ///
    /// A record claiming to be published keeps that status only when the
    /// user may publish directly and it passes validation; otherwise it is
    /// stored as a draft. Every imported record gets a version, and an item
    /// whose version cannot be stored is not left behind.
    pub async fn import<T: ContentRecord>(
        &self,
        user: &AuthUser,
        documents: Vec<Value>,
    ) -> AppResult<ImportSummary> {
        ensure(user, Action::Import)?;

        let repo = Repository::<T>::new(Arc::clone(&self.store));
        let workflow = self.settings.workflow();
        let may_publish = can(user.role, workflow.publish_action());
        let mut summary = ImportSummary::default();

        for (index, document) in documents.into_iter().enumerate() {
            let mut record: T = match prepare_document(document)
                .and_then(|d| serde_json::from_value(d).map_err(|e| e.to_string()))
            {
                Ok(record) => record,
                Err(e) => {
                    summary.record_failure(index, e);
                    continue;
                }
            };

            if workflow.auto_slug && record.publishing().slug.is_empty() {
                let slug = generate_slug(record.title());
                record.publishing_mut().slug = slug;
            }
            if record.publishing().is_published() {
                if !may_publish {
                    warn!(
                        content_id = %record.id(),
                        role = %user.role,
                        "user may not publish, imported as draft"
                    );
                    record.publishing_mut().mark_draft();
                } else if !workflow.rule_set.validate(record.publishing()).valid {
                    warn!(content_id = %record.id(), "imported record fails validation, stored as draft");
                    record.publishing_mut().mark_draft();
                } else if record.publishing().published_at.is_none() {
                    record.publishing_mut().published_at = Some(Utc::now());
                }
            }

            let previous = match repo.get(record.id()).await {
                Ok(previous) => previous,
                Err(e) => {
                    summary.record_failure(index, e);
                    continue;
                }
            };
            if let Err(e) = self
                .versions
                .save_and_commit(&repo, &record, previous.as_ref(), "Imported", user)
                .await
            {
                summary.record_failure(index, e);
                continue;
            }
            summary.success += 1;
        }

        info!(
            collection = %T::COLLECTION,
            success = summary.success,
            failed = summary.failed,
            user_id = %user.id,
            "import finished"
        );
        Ok(summary)
    }

    /// Read and import a JSON or YAML file as records of type `T`.
    pub async fn import_file<T: ContentRecord>(
        &self,
        user: &AuthUser,
        path: &Path,
    ) -> AppResult<ImportSummary> {
        ensure(user, Action::Import)?;

        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read import file {}", path.display()))?;
        let documents = parse_documents(path, &raw)?;
        self.import::<T>(user, documents).await
    }

    /// Import a file into the record type stored in `collection`.
    pub async fn import_into(
        &self,
        user: &AuthUser,
        collection: Collection,
        path: &Path,
    ) -> AppResult<ImportSummary> {
        match collection {
            Collection::Lexicon => self.import_file::<LexiconEntry>(user, path).await,
            Collection::GrammarRules => self.import_file::<GrammarRule>(user, path).await,
            Collection::Scenarios => self.import_file::<Scenario>(user, path).await,
            Collection::ContentItems => self.import_file::<ContentItem>(user, path).await,
            other => Err(AppError::BadRequest(format!(
                "cannot import into {other}"
            ))),
        }
    }
}
