//! Structured data (schema.org JSON-LD) generation.
//!
//! Generation is independent of publishing validation: editors preview
//! JSON-LD for drafts as well as published records.

pub mod templates;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::models::{ContentRecord, FaqItem, PublishingData};

pub use templates::{
    LocalizedText, StructuredDataTemplate, TemplateValidation, all_templates,
    apply_template_with_data, get_template_by_id, get_templates_for_content_type,
    validate_template_data,
};

pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Input for [`generate_jsonld`].
#[derive(Debug, Clone, Default)]
pub struct JsonLdSource {
    pub title: String,
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub faqs: Vec<FaqItem>,
}

impl JsonLdSource {
    /// Build the source from a record's title, SEO description and FAQ list.
    pub fn from_record<T: ContentRecord>(record: &T) -> Self {
        let publishing = record.publishing();
        let title = if publishing.seo.title.is_empty() {
            record.title().to_string()
        } else {
            publishing.seo.title.clone()
        };

        Self {
            title,
            description: publishing.seo.description.clone(),
            published_at: publishing.published_at,
            updated_at: Some(record.updated_at()),
            author: None,
            faqs: publishing.geo.faq.clone(),
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Build a minimal schema.org object for `kind`.
///
/// `Article` and `FAQPage` are filled from `source`. `HowTo` and any other
/// kind only get `@context` and `@type`.
pub fn generate_jsonld(kind: &str, source: &JsonLdSource) -> Value {
    let mut schema = Map::new();
    schema.insert("@context".to_string(), json!(SCHEMA_CONTEXT));
    schema.insert("@type".to_string(), json!(kind));

    match kind {
        "Article" => {
            schema.insert("headline".to_string(), json!(source.title));
            schema.insert("description".to_string(), json!(source.description));
            if let Some(at) = source.published_at {
                schema.insert("datePublished".to_string(), timestamp(at));
            }
            if let Some(at) = source.updated_at {
                schema.insert("dateModified".to_string(), timestamp(at));
            }
            if let Some(author) = &source.author {
                schema.insert(
                    "author".to_string(),
                    json!({"@type": "Person", "name": author}),
                );
            }
        }
        "FAQPage" => {
            let entities: Vec<Value> = source
                .faqs
                .iter()
                .map(|faq| {
                    json!({
                        "@type": "Question",
                        "name": faq.question,
                        "acceptedAnswer": {
                            "@type": "Answer",
                            "text": faq.answer,
                        },
                    })
                })
                .collect();
            schema.insert("mainEntity".to_string(), Value::Array(entities));
        }
        _ => {}
    }

    Value::Object(schema)
}

/// Render the JSON-LD payload stored on a record, if any.
///
/// Produces `@context` and `@type` followed by the stored data keys.
pub fn record_structured_data(data: &PublishingData) -> Option<Value> {
    let payload = data.jsonld.as_ref()?;

    let mut schema = Map::new();
    schema.insert("@context".to_string(), json!(SCHEMA_CONTEXT));
    schema.insert("@type".to_string(), json!(payload.schema_type));
    if let Some(fields) = payload.data.as_object() {
        for (key, value) in fields {
            if key != "@context" && key != "@type" {
                schema.insert(key.clone(), value.clone());
            }
        }
    }
    Some(Value::Object(schema))
}

/// Wrap a schema in a `<script type="application/ld+json">` tag.
///
/// The body is the schema pretty-printed with two-space indentation.
pub fn generate_script_tag(schema: &Value) -> String {
    // Serializing a `Value` cannot fail: map keys are always strings.
    let body = serde_json::to_string_pretty(schema).unwrap_or_default();
    format!("<script type=\"application/ld+json\">\n{body}\n</script>")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::JsonLdSpec;

    fn source() -> JsonLdSource {
        JsonLdSource {
            title: "Using 是".to_string(),
            description: "How to link nouns".to_string(),
            published_at: Some("2026-03-01T08:00:00Z".parse().unwrap()),
            updated_at: Some("2026-03-02T08:00:00Z".parse().unwrap()),
            author: None,
            faqs: vec![FaqItem {
                question: "Is 是 a verb?".to_string(),
                answer: "Yes.".to_string(),
            }],
        }
    }

    #[test]
    fn article_fields() {
        let schema = generate_jsonld("Article", &source());
        assert_eq!(schema["@context"], "https://schema.org");
        assert_eq!(schema["@type"], "Article");
        assert_eq!(schema["headline"], "Using 是");
        assert_eq!(schema["datePublished"], "2026-03-01T08:00:00.000Z");
        assert!(schema.get("author").is_none());

        let mut with_author = source();
        with_author.author = Some("Li Wei".to_string());
        let schema = generate_jsonld("Article", &with_author);
        assert_eq!(schema["author"]["@type"], "Person");
        assert_eq!(schema["author"]["name"], "Li Wei");
    }

    #[test]
    fn faq_page_entities() {
        let schema = generate_jsonld("FAQPage", &source());
        let entities = schema["mainEntity"].as_array().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0]["@type"], "Question");
        assert_eq!(entities[0]["acceptedAnswer"]["@type"], "Answer");
        assert_eq!(entities[0]["acceptedAnswer"]["text"], "Yes.");
    }

    #[test]
    fn how_to_and_unknown_kinds_are_minimal() {
        for kind in ["HowTo", "Recipe"] {
            let schema = generate_jsonld(kind, &source());
            let keys: Vec<&String> = schema.as_object().unwrap().keys().collect();
            assert_eq!(keys, vec!["@context", "@type"]);
        }
    }

    #[test]
    fn script_tag_wraps_pretty_json() {
        let schema = json!({"@context": "https://schema.org", "@type": "HowTo"});
        let tag = generate_script_tag(&schema);
        assert_eq!(
            tag,
            "<script type=\"application/ld+json\">\n{\n  \"@context\": \"https://schema.org\",\n  \"@type\": \"HowTo\"\n}\n</script>"
        );
    }

    #[test]
    fn stored_payload_is_rendered() {
        let data = PublishingData {
            jsonld: Some(JsonLdSpec {
                schema_type: "DefinedTerm".to_string(),
                data: json!({"@type": "Ignored", "name": "是"}),
            }),
            ..Default::default()
        };
        let schema = record_structured_data(&data).unwrap();
        assert_eq!(schema["@type"], "DefinedTerm");
        assert_eq!(schema["name"], "是");
        assert!(record_structured_data(&PublishingData::default()).is_none());
    }
}
