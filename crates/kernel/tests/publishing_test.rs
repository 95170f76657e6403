#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Publishing rule tests.
//!
//! Slug generation and both validation rule sets, exercised through the
//! public API with stored-document shaped fixtures.

use lingua_kernel::models::{PublishingConfig, PublishingData};
use lingua_kernel::publishing::{
    RuleSet, generate_slug, is_publishable, is_valid_slug, validate_publishing,
    validate_publishing_basic, validate_seo_geo_strict,
};
use lingua_test_utils::{empty_publishing, ready_publishing};

fn data(fixture: &lingua_test_utils::TestPublishing) -> PublishingData {
    serde_json::from_value(fixture.to_json()).unwrap()
}

#[test]
fn test_slug_is_idempotent() {
    let inputs = [
        "",
        "   ",
        "Hello World",
        "使用 是 (shì)",
        "--a--b--",
        "Ünïcödé & symbols!!",
        "  中文  English  混合 ",
        "already-a-slug",
        "tabs\tand\nnewlines",
    ];
    for input in inputs {
        let once = generate_slug(input);
        assert_eq!(generate_slug(&once), once, "input: {input:?}");
    }
}

#[test]
fn test_slug_keeps_cjk_and_drops_punctuation() {
    let slug = generate_slug("使用 是 (shì)");
    assert!(slug.contains("使用"));
    assert!(slug.contains('是'));
    assert!(!slug.contains('('));
    assert!(!slug.contains(')'));
    assert!(is_valid_slug(&slug));
    assert_eq!(slug, slug.to_lowercase());
}

#[test]
fn test_missing_slug_is_invalid() {
    let result = validate_publishing(&data(&ready_publishing("")));
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e == "Slug is required"));
}

#[test]
fn test_minimal_valid_case() {
    let json = serde_json::json!({
        "slug": "a-b",
        "seo": {"title": "T", "description": "D"},
        "geo": {"snippet": "S", "keyPoints": ["a", "b", "c"]}
    });
    let data: PublishingData = serde_json::from_value(json).unwrap();
    let result = validate_publishing(&data);
    assert!(result.valid, "{:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_two_key_points_reports_count() {
    let result = validate_publishing(&data(&ready_publishing("ni-hao").with_key_point_count(2)));
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.contains('2')));
}

#[test]
fn test_empty_publishing_collects_every_error() {
    let result = validate_publishing_basic(&data(&empty_publishing()));
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 5);
}

#[test]
fn test_rule_sets_diverge() {
    // Passes the basic rules but is far below the strict minimum lengths.
    let fixture = ready_publishing("ni-hao")
        .with_seo_title("Short")
        .with_snippet("Brief.");
    let data = data(&fixture);

    assert!(RuleSet::Basic.validate(&data).valid);
    assert!(!RuleSet::Strict.validate(&data).valid);

    let strict = validate_seo_geo_strict(&PublishingConfig::from(&data));
    assert!(!strict.valid);
    assert_eq!(strict, is_publishable(&PublishingConfig::from(&data)));
}

#[test]
fn test_strict_rejects_too_many_key_points() {
    let data = data(&ready_publishing("ni-hao").with_key_point_count(6));

    let basic = RuleSet::Basic.validate(&data);
    assert!(basic.valid);
    assert_eq!(basic.warnings.len(), 1);

    let strict = RuleSet::Strict.validate(&data);
    assert!(!strict.valid);
}

#[test]
fn test_fixture_passes_both_rule_sets() {
    let data = data(&ready_publishing("hu-shi"));
    assert!(RuleSet::Basic.validate(&data).valid);
    assert!(RuleSet::Strict.validate(&data).valid);
}
