//! Publishing readiness: slugs and validation rule sets.

pub mod slug;
pub mod validator;

pub use slug::{generate_slug, is_valid_slug};
pub use validator::{
    RuleSet, ValidationResult, is_publishable, validate_publishing, validate_publishing_basic,
    validate_seo_geo_strict,
};
