//! Lingua test utilities.
//!
//! Helpers for integration testing: temporary directories, JSON fixture
//! builders for content documents and assertion utilities.

// Test support code: panicking on setup failure is the point.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Value as JsonValue, json};
use uuid::Uuid;

static TEST_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Temporary directory removed on drop.
#[derive(Debug)]
pub struct TestDir(PathBuf);

impl TestDir {
    /// Create a fresh, empty directory unique to this process and call.
    pub fn new(name: &str) -> Self {
        let n = TEST_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let path =
            std::env::temp_dir().join(format!("lingua_test_{name}_{n}_{}", std::process::id()));
        // Remove leftovers from a previous run, if any
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).expect("create test directory");
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Deref for TestDir {
    type Target = Path;
    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for TestDir {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Create publishing metadata that passes the basic publishing rules.
pub fn ready_publishing(slug: &str) -> TestPublishing {
    TestPublishing {
        slug: slug.to_string(),
        status: "draft".to_string(),
        seo_title: "Medical Chinese: talking to patients".to_string(),
        seo_description:
            "Phrases a nurse uses when greeting a patient and asking about symptoms in Mandarin."
                .to_string(),
        snippet: "Nurses greet patients with 您好 and ask 哪里不舒服 to learn where it hurts."
            .to_string(),
        key_points: vec![
            "Use 您 with patients".to_string(),
            "Ask 哪里不舒服".to_string(),
            "Confirm with 对吗".to_string(),
        ],
        faq: Vec::new(),
    }
}

/// Create empty publishing metadata.
pub fn empty_publishing() -> TestPublishing {
    TestPublishing {
        slug: String::new(),
        status: "draft".to_string(),
        seo_title: String::new(),
        seo_description: String::new(),
        snippet: String::new(),
        key_points: Vec::new(),
        faq: Vec::new(),
    }
}

/// Publishing metadata builder producing the stored JSON shape.
#[derive(Debug, Clone)]
pub struct TestPublishing {
    pub slug: String,
    pub status: String,
    pub seo_title: String,
    pub seo_description: String,
    pub snippet: String,
    pub key_points: Vec<String>,
    pub faq: Vec<(String, String)>,
}

impl TestPublishing {
    /// Set the slug.
    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    /// Mark as published.
    pub fn published(mut self) -> Self {
        self.status = "published".to_string();
        self
    }

    /// Set the SEO title.
    pub fn with_seo_title(mut self, title: &str) -> Self {
        self.seo_title = title.to_string();
        self
    }

    /// Set the GEO snippet.
    pub fn with_snippet(mut self, snippet: &str) -> Self {
        self.snippet = snippet.to_string();
        self
    }

    /// Replace the key points with `n` generated ones.
    pub fn with_key_point_count(mut self, n: usize) -> Self {
        self.key_points = (1..=n).map(|i| format!("Key point {i}")).collect();
        self
    }

    /// Add a FAQ entry.
    pub fn with_faq(mut self, question: &str, answer: &str) -> Self {
        self.faq.push((question.to_string(), answer.to_string()));
        self
    }

    /// Serialize to the camelCase document shape.
    pub fn to_json(&self) -> JsonValue {
        let faq: Vec<JsonValue> = self
            .faq
            .iter()
            .map(|(question, answer)| json!({"question": question, "answer": answer}))
            .collect();

        json!({
            "slug": self.slug,
            "status": self.status,
            "seo": {
                "title": self.seo_title,
                "description": self.seo_description,
                "keywords": [],
            },
            "geo": {
                "snippet": self.snippet,
                "keyPoints": self.key_points,
                "faq": faq,
            },
        })
    }
}

/// Import document for a lexicon entry.
pub fn lexicon_doc(word: &str, definition: &str, publishing: Option<&TestPublishing>) -> JsonValue {
    let mut doc = json!({
        "word": word,
        "definition": definition,
    });
    if let Some(publishing) = publishing {
        doc["publishing"] = publishing.to_json();
    }
    doc
}

/// Import document for a grammar rule with an explicit id.
pub fn grammar_doc(id: Uuid, title: &str, publishing: &TestPublishing) -> JsonValue {
    json!({
        "id": id,
        "title": title,
        "level": "HSK2",
        "explanation": format!("Explanation of {title}"),
        "examples": ["我是医生。"],
        "publishing": publishing.to_json(),
    })
}

/// Assertion helpers for JSON content.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a JSON value lacks a specific key.
    pub fn lacks_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_none(),
            "Expected JSON without key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_is_removed_on_drop() {
        let path = {
            let dir = TestDir::new("drop");
            assert!(dir.is_dir());
            dir.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn publishing_builder_shape() {
        let json = ready_publishing("ni-hao")
            .published()
            .with_key_point_count(4)
            .with_faq("Q?", "A.")
            .to_json();
        assert_eq!(json["slug"], "ni-hao");
        assert_eq!(json["status"], "published");
        assert_eq!(json["geo"]["keyPoints"].as_array().unwrap().len(), 4);
        assert_eq!(json["geo"]["faq"][0]["answer"], "A.");
    }

    #[test]
    fn lexicon_doc_without_publishing() {
        let doc = lexicon_doc("你好", "hello", None);
        assert::has_key(&doc, "word");
        assert::lacks_key(&doc, "publishing");
    }
}
