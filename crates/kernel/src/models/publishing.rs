//! Publishing metadata attached to every content record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    #[default]
    Draft,
    Published,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Draft => "draft",
            PublishStatus::Published => "published",
        }
    }
}

/// Search engine metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoMeta {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

/// A question/answer pair used for FAQ structured data and export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// Generative-engine metadata: content shaped for citation by answer engines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeoMeta {
    pub snippet: String,
    pub key_points: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faq: Vec<FaqItem>,
}

/// Templated structured-data payload stored with a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLdSpec {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Publishing data of a content record.
///
/// Empty strings stand for missing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublishingData {
    pub slug: String,
    pub status: PublishStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub seo: SeoMeta,
    pub geo: GeoMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonld: Option<JsonLdSpec>,
}

impl PublishingData {
    /// Check if the record is published.
    pub fn is_published(&self) -> bool {
        self.status == PublishStatus::Published
    }

    /// Flip to published and stamp the publication time.
    pub fn mark_published(&mut self, at: DateTime<Utc>) {
        self.status = PublishStatus::Published;
        self.published_at = Some(at);
    }

    /// Return to draft, clearing the publication time.
    pub fn mark_draft(&mut self) {
        self.status = PublishStatus::Draft;
        self.published_at = None;
    }
}

/// Input shape of the strict publishability check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    pub seo: SeoMeta,
    pub geo: GeoMeta,
}

impl From<&PublishingData> for PublishingConfig {
    fn from(data: &PublishingData) -> Self {
        Self {
            seo: data.seo.clone(),
            geo: data.geo.clone(),
        }
    }
}
