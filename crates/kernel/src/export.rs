//! Export of published content as flat JSON files for the public site.
//!
//! Each collection becomes one JSON array. Entries carry the record's
//! content fields plus the flattened GEO fields; the `publishing` object and
//! version metadata stay behind.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::AppResult;
use crate::models::version::content_fields;
use crate::models::{AuthUser, ContentRecord, GrammarRule, LexiconEntry, Scenario};
use crate::permissions::{Action, ensure};
use crate::storage::{ContentStore, Repository};

pub const LEXICON_FILE: &str = "lexicon.json";
pub const GRAMMAR_FILE: &str = "grammar.json";
pub const SCENARIOS_FILE: &str = "scenarios.json";

/// One written export file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub records: usize,
}

/// Result of a full export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub files: Vec<ExportedFile>,
}

impl ExportSummary {
    pub fn total_records(&self) -> usize {
        self.files.iter().map(|f| f.records).sum()
    }
}

/// Flatten a record into its public export shape.
pub fn export_entry<T: ContentRecord>(record: &T) -> serde_json::Result<Value> {
    let publishing = record.publishing();

    let mut entry = Map::new();
    entry.insert("id".to_string(), json!(record.id()));
    if let Value::Object(fields) = content_fields(record)? {
        entry.extend(fields);
    }
    entry.insert("slug".to_string(), json!(publishing.slug));
    entry.insert("geo_snippet".to_string(), json!(publishing.geo.snippet));
    entry.insert("key_points".to_string(), json!(publishing.geo.key_points));
    entry.insert("faq_json".to_string(), serde_json::to_value(&publishing.geo.faq)?);
    Ok(Value::Object(entry))
}

/// Writes the public JSON files.
#[derive(Clone)]
pub struct Exporter {
    store: Arc<dyn ContentStore>,
}

impl Exporter {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Export entries of the published records of one type, ordered by id.
    pub async fn published_entries<T: ContentRecord>(&self) -> AppResult<Vec<Value>> {
        let records = Repository::<T>::new(Arc::clone(&self.store)).list().await?;

        let mut entries = Vec::new();
        for record in records.iter().filter(|r| r.publishing().is_published()) {
            let entry = export_entry(record)
                .with_context(|| format!("failed to export {} record {}", T::COLLECTION, record.id()))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Write `lexicon.json`, `grammar.json` and `scenarios.json` into `dir`.
    pub async fn export_all(&self, user: &AuthUser, dir: &Path) -> AppResult<ExportSummary> {
        ensure(user, Action::Export)?;

        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create export directory {}", dir.display()))?;

        let files = vec![
            self.write_file(dir, LEXICON_FILE, self.published_entries::<LexiconEntry>().await?)
                .await?,
            self.write_file(dir, GRAMMAR_FILE, self.published_entries::<GrammarRule>().await?)
                .await?,
            self.write_file(dir, SCENARIOS_FILE, self.published_entries::<Scenario>().await?)
                .await?,
        ];

        let summary = ExportSummary { files };
        info!(
            dir = %dir.display(),
            records = summary.total_records(),
            user_id = %user.id,
            "content exported"
        );
        Ok(summary)
    }

    async fn write_file(
        &self,
        dir: &Path,
        file_name: &str,
        entries: Vec<Value>,
    ) -> AppResult<ExportedFile> {
        let path = dir.join(file_name);
        let raw = serde_json::to_string_pretty(&entries).context("failed to encode export")?;
        tokio::fs::write(&path, raw)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(ExportedFile {
            path,
            records: entries.len(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::FaqItem;

    #[test]
    fn entry_flattens_geo_fields() {
        let mut entry = LexiconEntry::new("医生", "doctor");
        entry.pinyin = "yīshēng".to_string();
        entry.publishing.slug = "医生".to_string();
        entry.publishing.geo.snippet = "医生 means doctor.".to_string();
        entry.publishing.geo.key_points = vec!["noun".to_string()];
        entry.publishing.geo.faq = vec![FaqItem {
            question: "How do you say doctor?".to_string(),
            answer: "医生".to_string(),
        }];

        let value = export_entry(&entry).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["id"], json!(entry.id));
        assert_eq!(obj["word"], "医生");
        assert_eq!(obj["pinyin"], "yīshēng");
        assert_eq!(obj["slug"], "医生");
        assert_eq!(obj["geo_snippet"], "医生 means doctor.");
        assert_eq!(obj["key_points"], json!(["noun"]));
        assert_eq!(obj["faq_json"][0]["answer"], "医生");
        assert!(!obj.contains_key("publishing"));
        assert!(!obj.contains_key("created_at"));
        assert!(!obj.contains_key("version_number"));
    }
}
