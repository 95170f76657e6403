//! Publishing readiness rules.
//!
//! Two rule sets exist side by side and are deliberately not merged:
//!
//! - the basic set ([`validate_publishing`]) used by the content editors,
//! - the strict set ([`is_publishable`]) with minimum lengths for the SEO
//!   and GEO texts.
//!
//! Both collect every violation instead of stopping at the first one, and
//! both only look at a handful of fields, so they are cheap enough to run
//! on every keystroke.

use serde::{Deserialize, Serialize};

use super::slug::is_valid_slug;
use crate::models::{PublishingConfig, PublishingData};

pub const SEO_TITLE_MAX: usize = 60;
pub const SEO_DESCRIPTION_MAX: usize = 160;
pub const KEY_POINTS_MIN: usize = 3;
pub const KEY_POINTS_MAX: usize = 5;

pub const STRICT_TITLE_MIN: usize = 10;
pub const STRICT_DESCRIPTION_MIN: usize = 50;
pub const STRICT_SNIPPET_MIN: usize = 50;

/// Outcome of a publishing check.
///
/// Errors block publishing; warnings never do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Named rule set selectable from the workflow settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSet {
    #[default]
    Basic,
    Strict,
}

impl RuleSet {
    /// Check a record's publishing data with this rule set.
    ///
    /// The strict set has no slug rule of its own; a record always needs a
    /// valid slug to be published, so the slug rule is checked first.
    pub fn validate(&self, data: &PublishingData) -> ValidationResult {
        match self {
            RuleSet::Basic => validate_publishing(data),
            RuleSet::Strict => {
                let mut errors = Vec::new();
                check_slug(&data.slug, &mut errors);

                let strict = is_publishable(&PublishingConfig::from(data));
                errors.extend(strict.errors);
                ValidationResult::from_parts(errors, strict.warnings)
            }
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn check_slug(slug: &str, errors: &mut Vec<String>) {
    if slug.is_empty() {
        errors.push("Slug is required".to_string());
    } else if !is_valid_slug(slug) {
        errors.push(
            "Slug may only contain lowercase letters, digits, CJK characters and single hyphens"
                .to_string(),
        );
    }
}

/// Basic publishing check.
pub fn validate_publishing(data: &PublishingData) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_slug(&data.slug, &mut errors);

    let title_len = char_len(&data.seo.title);
    if data.seo.title.is_empty() {
        errors.push("SEO title is required".to_string());
    } else if title_len > SEO_TITLE_MAX {
        warnings.push(format!(
            "SEO title is {title_len} characters; search results show about {SEO_TITLE_MAX}"
        ));
    }

    let description_len = char_len(&data.seo.description);
    if data.seo.description.is_empty() {
        errors.push("SEO description is required".to_string());
    } else if description_len > SEO_DESCRIPTION_MAX {
        warnings.push(format!(
            "SEO description is {description_len} characters; search results show about {SEO_DESCRIPTION_MAX}"
        ));
    }

    if data.geo.snippet.is_empty() {
        errors.push("GEO snippet is required".to_string());
    }

    let key_points = data.geo.key_points.len();
    if key_points < KEY_POINTS_MIN {
        errors.push(format!(
            "At least {KEY_POINTS_MIN} key points are required (currently {key_points})"
        ));
    } else if key_points > KEY_POINTS_MAX {
        warnings.push(format!(
            "{key_points} key points; {KEY_POINTS_MIN} to {KEY_POINTS_MAX} are recommended"
        ));
    }

    ValidationResult::from_parts(errors, warnings)
}

/// Alias of [`validate_publishing`] naming the rule set explicitly.
pub fn validate_publishing_basic(data: &PublishingData) -> ValidationResult {
    validate_publishing(data)
}

/// Strict publishing check over the nested SEO/GEO configuration.
pub fn is_publishable(config: &PublishingConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let title_len = char_len(&config.seo.title);
    if config.seo.title.is_empty() {
        errors.push("SEO title is required".to_string());
    } else if title_len < STRICT_TITLE_MIN {
        errors.push(format!(
            "SEO title must be at least {STRICT_TITLE_MIN} characters (currently {title_len})"
        ));
    } else if title_len > SEO_TITLE_MAX {
        warnings.push(format!(
            "SEO title is {title_len} characters; search results show about {SEO_TITLE_MAX}"
        ));
    }

    let description_len = char_len(&config.seo.description);
    if config.seo.description.is_empty() {
        errors.push("SEO description is required".to_string());
    } else if description_len < STRICT_DESCRIPTION_MIN {
        errors.push(format!(
            "SEO description must be at least {STRICT_DESCRIPTION_MIN} characters (currently {description_len})"
        ));
    } else if description_len > SEO_DESCRIPTION_MAX {
        warnings.push(format!(
            "SEO description is {description_len} characters; search results show about {SEO_DESCRIPTION_MAX}"
        ));
    }

    let snippet_len = char_len(&config.geo.snippet);
    if config.geo.snippet.is_empty() {
        errors.push("GEO snippet is required".to_string());
    } else if snippet_len < STRICT_SNIPPET_MIN {
        errors.push(format!(
            "GEO snippet must be at least {STRICT_SNIPPET_MIN} characters (currently {snippet_len})"
        ));
    }

    let key_points = config.geo.key_points.len();
    if key_points < KEY_POINTS_MIN {
        errors.push(format!(
            "At least {KEY_POINTS_MIN} key points are required (currently {key_points})"
        ));
    } else if key_points > KEY_POINTS_MAX {
        errors.push(format!(
            "At most {KEY_POINTS_MAX} key points are allowed (currently {key_points})"
        ));
    }

    ValidationResult::from_parts(errors, warnings)
}

/// Alias of [`is_publishable`] naming the rule set explicitly.
pub fn validate_seo_geo_strict(config: &PublishingConfig) -> ValidationResult {
    is_publishable(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::{GeoMeta, SeoMeta};

    fn minimal() -> PublishingData {
        PublishingData {
            slug: "a-b".to_string(),
            seo: SeoMeta {
                title: "T".to_string(),
                description: "D".to_string(),
                keywords: Vec::new(),
            },
            geo: GeoMeta {
                snippet: "S".to_string(),
                key_points: vec!["a".into(), "b".into(), "c".into()],
                faq: Vec::new(),
            },
            ..Default::default()
        }
    }

    fn strict_config() -> PublishingConfig {
        PublishingConfig {
            seo: SeoMeta {
                title: "Using 是 in sentences".to_string(),
                description: "x".repeat(80),
                keywords: Vec::new(),
            },
            geo: GeoMeta {
                snippet: "y".repeat(60),
                key_points: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                faq: Vec::new(),
            },
        }
    }

    #[test]
    fn minimal_record_is_valid() {
        let result = validate_publishing(&minimal());
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn missing_slug_is_an_error() {
        let mut data = minimal();
        data.slug.clear();
        let result = validate_publishing(&data);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e == "Slug is required"));
    }

    #[test]
    fn malformed_slug_is_an_error() {
        let mut data = minimal();
        data.slug = "Not A Slug".to_string();
        let result = validate_publishing(&data);
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("Slug may only contain"));
    }

    #[test]
    fn two_key_points_reports_count() {
        let mut data = minimal();
        data.geo.key_points.pop();
        let result = validate_publishing(&data);
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains('2')));
    }

    #[test]
    fn long_texts_only_warn() {
        let mut data = minimal();
        data.seo.title = "t".repeat(61);
        data.seo.description = "d".repeat(161);
        data.geo.key_points = (0..6).map(|i| i.to_string()).collect();

        let result = validate_publishing(&data);
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 3);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let mut data = minimal();
        // 60 CJK characters are 180 bytes but still within the title limit.
        data.seo.title = "语".repeat(60);
        assert!(validate_publishing(&data).warnings.is_empty());
    }

    #[test]
    fn all_violations_are_collected() {
        let result = validate_publishing(&PublishingData::default());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 5);
    }

    #[test]
    fn strict_accepts_complete_config() {
        let result = is_publishable(&strict_config());
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
    }

    #[test]
    fn strict_enforces_minimum_lengths() {
        let mut config = strict_config();
        config.seo.title = "Short".to_string();
        config.seo.description = "Too short".to_string();
        config.geo.snippet = "Tiny".to_string();

        let result = validate_seo_geo_strict(&config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors[0].contains("at least 10"));
    }

    #[test]
    fn strict_rejects_too_many_key_points() {
        let mut config = strict_config();
        config.geo.key_points = (0..6).map(|i| i.to_string()).collect();
        let result = is_publishable(&config);
        assert!(!result.valid);
        assert!(result.errors[0].contains('6'));
    }

    #[test]
    fn minimal_record_fails_strict_rules() {
        // The two rule sets disagree on purpose.
        let data = minimal();
        assert!(RuleSet::Basic.validate(&data).valid);
        assert!(!RuleSet::Strict.validate(&data).valid);
    }

    #[test]
    fn strict_rule_set_checks_slug() {
        let mut data = PublishingData {
            seo: strict_config().seo,
            geo: strict_config().geo,
            ..Default::default()
        };
        let result = RuleSet::Strict.validate(&data);
        assert_eq!(result.errors, vec!["Slug is required".to_string()]);

        data.slug = "shi".to_string();
        assert!(RuleSet::Strict.validate(&data).valid);
    }
}
