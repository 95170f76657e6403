//! Content records managed by the console.
//!
//! Every record type carries a [`PublishingData`] block and implements
//! [`ContentRecord`], which is what the storage, workflow, versioning and
//! export layers are generic over.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::publishing::PublishingData;
use crate::error::AppError;
use crate::storage::Collection;

/// Content types known to the structured-data template catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendedContentType {
    Lexicon,
    Grammar,
    Scenario,
    Article,
    Faq,
    HowTo,
}

impl ExtendedContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexicon => "lexicon",
            Self::Grammar => "grammar",
            Self::Scenario => "scenario",
            Self::Article => "article",
            Self::Faq => "faq",
            Self::HowTo => "how_to",
        }
    }
}

impl fmt::Display for ExtendedContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtendedContentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexicon" => Ok(Self::Lexicon),
            "grammar" => Ok(Self::Grammar),
            "scenario" => Ok(Self::Scenario),
            "article" => Ok(Self::Article),
            "faq" => Ok(Self::Faq),
            "how_to" | "howto" => Ok(Self::HowTo),
            other => Err(AppError::BadRequest(format!("unknown content type '{other}'"))),
        }
    }
}

/// A persisted content record with publishing data.
pub trait ContentRecord: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection the record type is stored in.
    const COLLECTION: Collection;

    fn id(&self) -> Uuid;

    /// Human-facing title, used for slugs and version snapshots.
    fn title(&self) -> &str;

    fn content_type(&self) -> ExtendedContentType;

    fn publishing(&self) -> &PublishingData;

    fn publishing_mut(&mut self) -> &mut PublishingData;

    /// Last modification time.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Record a modification time.
    fn touch(&mut self, at: DateTime<Utc>);
}

/// Lexicon entry (a single word or phrase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub id: Uuid,
    pub word: String,
    #[serde(default)]
    pub pinyin: String,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub publishing: PublishingData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LexiconEntry {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            word: word.into(),
            pinyin: String::new(),
            definition: definition.into(),
            part_of_speech: String::new(),
            examples: Vec::new(),
            publishing: PublishingData::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ContentRecord for LexiconEntry {
    const COLLECTION: Collection = Collection::Lexicon;

    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.word
    }

    fn content_type(&self) -> ExtendedContentType {
        ExtendedContentType::Lexicon
    }

    fn publishing(&self) -> &PublishingData {
        &self.publishing
    }

    fn publishing_mut(&mut self) -> &mut PublishingData {
        &mut self.publishing
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Grammar rule with explanation and examples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarRule {
    pub id: Uuid,
    pub title: String,
    /// Proficiency level label, e.g. "HSK 2".
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub publishing: PublishingData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GrammarRule {
    pub fn new(title: impl Into<String>, explanation: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            level: String::new(),
            explanation: explanation.into(),
            examples: Vec::new(),
            publishing: PublishingData::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ContentRecord for GrammarRule {
    const COLLECTION: Collection = Collection::GrammarRules;

    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content_type(&self) -> ExtendedContentType {
        ExtendedContentType::Grammar
    }

    fn publishing(&self) -> &PublishingData {
        &self.publishing
    }

    fn publishing_mut(&mut self) -> &mut PublishingData {
        &mut self.publishing
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// One line of a scenario dialogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueLine {
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub translation: String,
}

/// Medical dialogue scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: Uuid,
    pub title: String,
    /// Medical specialty, e.g. "cardiology".
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
    #[serde(default)]
    pub publishing: PublishingData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Scenario {
    pub fn new(title: impl Into<String>, specialty: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            specialty: specialty.into(),
            description: String::new(),
            dialogue: Vec::new(),
            publishing: PublishingData::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ContentRecord for Scenario {
    const COLLECTION: Collection = Collection::Scenarios;

    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content_type(&self) -> ExtendedContentType {
        ExtendedContentType::Scenario
    }

    fn publishing(&self) -> &PublishingData {
        &self.publishing
    }

    fn publishing_mut(&mut self) -> &mut PublishingData {
        &mut self.publishing
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

/// Generic content item (articles, FAQ pages, how-tos).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub content_type: ExtendedContentType,
    pub title: String,
    /// Free-form body, shaped by the content type's editor.
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default)]
    pub publishing: PublishingData,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    pub fn new(content_type: ExtendedContentType, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            content_type,
            title: title.into(),
            body: serde_json::json!({}),
            publishing: PublishingData::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl ContentRecord for ContentItem {
    const COLLECTION: Collection = Collection::ContentItems;

    fn id(&self) -> Uuid {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn content_type(&self) -> ExtendedContentType {
        self.content_type
    }

    fn publishing(&self) -> &PublishingData {
        &self.publishing
    }

    fn publishing_mut(&mut self) -> &mut PublishingData {
        &mut self.publishing
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn new_records_start_as_drafts() {
        let entry = LexiconEntry::new("是", "to be");
        assert!(!entry.publishing().is_published());
        assert_eq!(entry.title(), "是");
        assert_eq!(LexiconEntry::COLLECTION, Collection::Lexicon);
    }

    #[test]
    fn content_item_reports_its_own_type() {
        let item = ContentItem::new(ExtendedContentType::HowTo, "Taking a pulse");
        assert_eq!(item.content_type(), ExtendedContentType::HowTo);
    }

    #[test]
    fn content_type_parsing() {
        assert_eq!(
            "how_to".parse::<ExtendedContentType>().unwrap(),
            ExtendedContentType::HowTo
        );
        assert_eq!(
            "grammar".parse::<ExtendedContentType>().unwrap(),
            ExtendedContentType::Grammar
        );
        assert!("video".parse::<ExtendedContentType>().is_err());
    }

    #[test]
    fn scenario_deserializes_without_optional_fields() {
        let scenario: Scenario = serde_json::from_value(serde_json::json!({
            "id": Uuid::now_v7(),
            "title": "Chest pain triage",
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert!(scenario.dialogue.is_empty());
        assert!(scenario.publishing.slug.is_empty());
    }
}
