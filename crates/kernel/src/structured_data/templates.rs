//! Static catalog of structured-data templates.
//!
//! Each template is a JSON-LD skeleton plus the content types it applies to.
//! The catalog is built once and never changes at runtime.

use std::sync::LazyLock;

use serde::Serialize;
use serde_json::{Value, json};

use crate::models::ExtendedContentType;

/// Text in both console languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalizedText {
    pub zh: &'static str,
    pub en: &'static str,
}

/// A JSON-LD template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataTemplate {
    pub id: &'static str,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub content_types: Vec<ExtendedContentType>,
    /// JSON-LD skeleton; unset values are empty strings or empty arrays.
    pub schema: Value,
    /// Top-level or dotted field paths that must be filled.
    pub required_fields: Vec<&'static str>,
}

/// Result of [`validate_template_data`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateValidation {
    pub is_valid: bool,
    pub missing_fields: Vec<String>,
}

static TEMPLATES: LazyLock<Vec<StructuredDataTemplate>> = LazyLock::new(|| {
    use ExtendedContentType::{Article, Faq, Grammar, HowTo, Lexicon, Scenario};

    vec![
        StructuredDataTemplate {
            id: "defined-term-set",
            name: LocalizedText {
                zh: "术语集",
                en: "Defined term set",
            },
            description: LocalizedText {
                zh: "词汇表或主题词汇集合",
                en: "A glossary or themed vocabulary list",
            },
            content_types: vec![Lexicon],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "DefinedTermSet",
                "name": "",
                "description": "",
                "inLanguage": "zh-CN",
                "hasDefinedTerm": [
                    {
                        "@type": "DefinedTerm",
                        "name": "",
                        "description": "",
                    }
                ],
            }),
            required_fields: vec!["name", "description"],
        },
        StructuredDataTemplate {
            id: "defined-term",
            name: LocalizedText {
                zh: "术语",
                en: "Defined term",
            },
            description: LocalizedText {
                zh: "单个词条及其释义",
                en: "A single lexicon entry with its definition",
            },
            content_types: vec![Lexicon],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "DefinedTerm",
                "name": "",
                "description": "",
                "termCode": "",
                "inDefinedTermSet": {
                    "@type": "DefinedTermSet",
                    "name": "",
                },
            }),
            required_fields: vec!["name", "description"],
        },
        StructuredDataTemplate {
            id: "learning-resource",
            name: LocalizedText {
                zh: "学习资源",
                en: "Learning resource",
            },
            description: LocalizedText {
                zh: "语法点或课程材料",
                en: "A grammar point or lesson material",
            },
            content_types: vec![Grammar, Scenario],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "LearningResource",
                "name": "",
                "description": "",
                "educationalLevel": "",
                "learningResourceType": "",
                "inLanguage": "zh-CN",
                "teaches": [],
            }),
            required_fields: vec!["name", "description", "educationalLevel"],
        },
        StructuredDataTemplate {
            id: "faq-page",
            name: LocalizedText {
                zh: "常见问题",
                en: "FAQ page",
            },
            description: LocalizedText {
                zh: "问答列表，适合生成式搜索引用",
                en: "Question and answer list for answer engines",
            },
            content_types: vec![Grammar, Lexicon, Scenario, Faq],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "FAQPage",
                "mainEntity": [],
            }),
            required_fields: vec!["mainEntity"],
        },
        StructuredDataTemplate {
            id: "how-to",
            name: LocalizedText {
                zh: "操作指南",
                en: "How-to",
            },
            description: LocalizedText {
                zh: "分步骤说明",
                en: "Step-by-step instructions",
            },
            content_types: vec![Grammar, HowTo],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "HowTo",
                "name": "",
                "description": "",
                "totalTime": "",
                "step": [],
            }),
            required_fields: vec!["name", "step"],
        },
        StructuredDataTemplate {
            id: "medical-scenario",
            name: LocalizedText {
                zh: "医疗对话场景",
                en: "Medical dialogue scenario",
            },
            description: LocalizedText {
                zh: "医患对话练习",
                en: "Doctor and patient conversation practice",
            },
            content_types: vec![Scenario],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "LearningResource",
                "name": "",
                "description": "",
                "learningResourceType": "dialogue",
                "inLanguage": "zh-CN",
                "about": {
                    "@type": "MedicalSpecialty",
                    "name": "",
                },
                "audience": {
                    "@type": "MedicalAudience",
                    "audienceType": "",
                },
            }),
            required_fields: vec!["name", "description", "about.name"],
        },
        StructuredDataTemplate {
            id: "article",
            name: LocalizedText {
                zh: "文章",
                en: "Article",
            },
            description: LocalizedText {
                zh: "通用文章",
                en: "General article",
            },
            content_types: vec![Article, Grammar],
            schema: json!({
                "@context": "https://schema.org",
                "@type": "Article",
                "headline": "",
                "description": "",
                "datePublished": "",
                "dateModified": "",
                "author": {
                    "@type": "Person",
                    "name": "",
                },
            }),
            required_fields: vec!["headline", "description", "datePublished"],
        },
    ]
});

/// All templates in catalog order.
pub fn all_templates() -> &'static [StructuredDataTemplate] {
    &TEMPLATES
}

/// Templates applicable to a content type.
pub fn get_templates_for_content_type(
    content_type: ExtendedContentType,
) -> Vec<&'static StructuredDataTemplate> {
    TEMPLATES
        .iter()
        .filter(|t| t.content_types.contains(&content_type))
        .collect()
}

/// Look up a template by id.
pub fn get_template_by_id(id: &str) -> Option<&'static StructuredDataTemplate> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Fill a template's skeleton with values from `data`.
///
/// Only keys present in the skeleton are considered. Scalars are
/// overwritten, nested objects are merged recursively and arrays are
/// replaced wholesale when `data` also holds an array. Anything that does
/// not fit the skeleton's shape is ignored and the default is kept.
pub fn apply_template_with_data(template: &StructuredDataTemplate, data: &Value) -> Value {
    let mut schema = template.schema.clone();
    overlay(&mut schema, data);
    schema
}

fn overlay(target: &mut Value, data: &Value) {
    let (Some(target), Some(data)) = (target.as_object_mut(), data.as_object()) else {
        return;
    };

    for (key, slot) in target.iter_mut() {
        let Some(incoming) = data.get(key) else {
            continue;
        };

        if slot.is_object() {
            if incoming.is_object() {
                overlay(slot, incoming);
            }
        } else if slot.is_array() {
            if incoming.is_array() {
                *slot = incoming.clone();
            }
        } else {
            *slot = incoming.clone();
        }
    }
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |current, part| current.get(part))
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Check that every required field of a template is present in `data`.
///
/// A field is missing when absent, null, an empty string or an empty array.
pub fn validate_template_data(
    template: &StructuredDataTemplate,
    data: &Value,
) -> TemplateValidation {
    let missing_fields: Vec<String> = template
        .required_fields
        .iter()
        .filter(|field| is_missing(lookup(data, field)))
        .map(|field| field.to_string())
        .collect();

    TemplateValidation {
        is_valid: missing_fields.is_empty(),
        missing_fields,
    }
}
