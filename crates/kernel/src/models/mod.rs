//! Data models.

pub mod content;
pub mod publishing;
pub mod review;
pub mod user;
pub mod version;

pub use content::{
    ContentItem, ContentRecord, DialogueLine, ExtendedContentType, GrammarRule, LexiconEntry,
    Scenario,
};
pub use publishing::{
    FaqItem, GeoMeta, JsonLdSpec, PublishStatus, PublishingConfig, PublishingData, SeoMeta,
};
pub use review::{ReviewRequest, ReviewState};
pub use user::AuthUser;
pub use version::ContentVersion;
