//! Field-level comparison of two content versions.

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::ContentVersion;

/// Fields compared between versions, in display order.
pub const COMPARED_FIELDS: [(&str, &str); 7] = [
    ("title", "Title"),
    ("slug", "Slug"),
    ("status", "Status"),
    ("seo_json", "SEO"),
    ("geo_json", "GEO"),
    ("content_json", "Content"),
    ("published_at", "Published at"),
];

/// One compared field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffItem {
    pub field: &'static str,
    pub label: &'static str,
    pub old_value: Value,
    pub new_value: Value,
    pub has_changes: bool,
    /// Display rendering of `old_value`.
    pub old_display: String,
    /// Display rendering of `new_value`.
    pub new_display: String,
}

/// Comparison of two versions of the same record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionComparison {
    pub from_version: u32,
    pub to_version: u32,
    pub diffs: Vec<DiffItem>,
}

impl VersionComparison {
    /// Only the fields that differ.
    pub fn changed(&self) -> impl Iterator<Item = &DiffItem> {
        self.diffs.iter().filter(|d| d.has_changes)
    }

    pub fn has_changes(&self) -> bool {
        self.diffs.iter().any(|d| d.has_changes)
    }
}

fn field_value(version: &ContentVersion, field: &str) -> Value {
    match field {
        "title" => json!(version.title),
        "slug" => json!(version.slug),
        "status" => json!(version.status),
        "seo_json" => version.seo_json.clone(),
        "geo_json" => version.geo_json.clone(),
        "content_json" => version.content_json.clone(),
        "published_at" => json!(version.published_at),
        _ => Value::Null,
    }
}

/// Render a value for display. Strings are shown bare, structures as pretty JSON.
fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

/// Compare two versions field by field.
///
/// Every field in [`COMPARED_FIELDS`] is reported, changed or not. Values
/// are compared structurally, so objects whose keys merely appear in a
/// different order are equal.
pub fn compare_versions(older: &ContentVersion, newer: &ContentVersion) -> VersionComparison {
    let diffs = COMPARED_FIELDS
        .iter()
        .map(|&(field, label)| {
            let old_value = field_value(older, field);
            let new_value = field_value(newer, field);
            DiffItem {
                field,
                label,
                has_changes: old_value != new_value,
                old_display: display(&old_value),
                new_display: display(&new_value),
                old_value,
                new_value,
            }
        })
        .collect();

    VersionComparison {
        from_version: older.version_number,
        to_version: newer.version_number,
        diffs,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::GrammarRule;
    use uuid::Uuid;

    fn version(rule: &GrammarRule, number: u32) -> ContentVersion {
        ContentVersion::snapshot(rule, number, "", Uuid::nil()).unwrap()
    }

    #[test]
    fn identical_versions_have_no_changes() {
        let rule = GrammarRule::new("是 sentences", "A 是 B");
        let v = version(&rule, 1);
        let comparison = compare_versions(&v, &v);
        assert_eq!(comparison.diffs.len(), COMPARED_FIELDS.len());
        assert!(comparison.diffs.iter().all(|d| !d.has_changes));
        assert!(!comparison.has_changes());
    }

    #[test]
    fn field_order_is_stable() {
        let mut rule = GrammarRule::new("是 sentences", "A 是 B");
        let v1 = version(&rule, 1);
        rule.publishing.slug = "shi".to_string();
        let v2 = version(&rule, 2);

        let fields: Vec<&str> = compare_versions(&v1, &v2).diffs.iter().map(|d| d.field).collect();
        let expected: Vec<&str> = COMPARED_FIELDS.iter().map(|(f, _)| *f).collect();
        assert_eq!(fields, expected);

        let changed: Vec<&str> = compare_versions(&v1, &v2).changed().map(|d| d.field).collect();
        assert_eq!(changed, vec!["slug"]);
    }

    #[test]
    fn key_order_does_not_count_as_change() {
        let rule = GrammarRule::new("是 sentences", "A 是 B");
        let v1 = version(&rule, 1);
        let mut v2 = v1.clone();
        v2.version_number = 2;
        v2.seo_json = json!({"keywords": [], "description": "", "title": ""});

        let comparison = compare_versions(&v1, &v2);
        let seo = comparison.diffs.iter().find(|d| d.field == "seo_json").unwrap();
        assert!(!seo.has_changes);
    }

    #[test]
    fn displays_are_readable() {
        let mut rule = GrammarRule::new("Old", "A 是 B");
        let v1 = version(&rule, 1);
        rule.title = "New".to_string();
        rule.publishing.geo.key_points = vec!["one".to_string()];
        let v2 = version(&rule, 2);

        let comparison = compare_versions(&v1, &v2);
        let title = &comparison.diffs[0];
        assert!(title.has_changes);
        assert_eq!(title.old_display, "Old");
        assert_eq!(title.new_display, "New");

        let geo = comparison.diffs.iter().find(|d| d.field == "geo_json").unwrap();
        assert!(geo.has_changes);
        assert!(geo.new_display.contains("\n  \"keyPoints\""));
        assert_eq!(comparison.from_version, 1);
        assert_eq!(comparison.to_version, 2);
    }
}
