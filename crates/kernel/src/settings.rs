//! Console settings with an explicit load/persist lifecycle.
//!
//! Locale preference, dismissed banners and team/workflow settings are held
//! by a [`SettingsProvider`] that callers receive through
//! [`AppState`](crate::state::AppState). Nothing here is global.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::AuthUser;
use crate::permissions::{Action, ensure};
use crate::publishing::RuleSet;

/// Console display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Zh => f.write_str("zh"),
            Locale::En => f.write_str("en"),
        }
    }
}

impl FromStr for Locale {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zh" | "zh-cn" => Ok(Locale::Zh),
            "en" => Ok(Locale::En),
            other => Err(AppError::BadRequest(format!("unsupported locale '{other}'"))),
        }
    }
}

/// Team settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSettings {
    pub name: String,
    /// Email of the reviewer new review requests are addressed to.
    pub default_reviewer: Option<String>,
}

/// Publishing workflow settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// When set, only review approvers may publish directly; everyone else
    /// goes through a review request.
    pub require_review: bool,

    /// Validation rule set applied on publish.
    pub rule_set: RuleSet,

    /// Fill an empty slug from the title when saving a draft.
    pub auto_slug: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            require_review: false,
            rule_set: RuleSet::Basic,
            auto_slug: true,
        }
    }
}

impl WorkflowSettings {
    /// Permission needed to publish directly under these settings.
    pub fn publish_action(&self) -> Action {
        if self.require_review {
            Action::ApproveReview
        } else {
            Action::Publish
        }
    }
}

/// All console settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub locale: Locale,
    pub dismissed_banners: BTreeSet<String>,
    pub team: TeamSettings,
    pub workflow: WorkflowSettings,
}

/// Holder of the current settings and their backing TOML file.
#[derive(Debug)]
pub struct SettingsProvider {
    path: PathBuf,
    current: RwLock<ConsoleSettings>,
}

impl SettingsProvider {
    /// Load settings from `path`. A missing file yields the defaults.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let settings = if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read settings {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings {}", path.display()))?
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            ConsoleSettings::default()
        };

        Ok(Self {
            path,
            current: RwLock::new(settings),
        })
    }

    /// Provider holding `settings`, backed by `path` once persisted.
    pub fn with_settings(path: impl Into<PathBuf>, settings: ConsoleSettings) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current settings.
    pub fn get(&self) -> ConsoleSettings {
        self.current.read().clone()
    }

    /// Current workflow settings.
    pub fn workflow(&self) -> WorkflowSettings {
        self.current.read().workflow.clone()
    }

    /// Modify the in-memory settings. Call [`persist`](Self::persist) to save.
    pub fn update(&self, f: impl FnOnce(&mut ConsoleSettings)) -> ConsoleSettings {
        let mut guard = self.current.write();
        f(&mut *guard);
        guard.clone()
    }

    pub fn set_locale(&self, locale: Locale) {
        self.update(|s| s.locale = locale);
    }

    /// Mark a banner as dismissed. Returns `false` if it already was.
    pub fn dismiss_banner(&self, banner: &str) -> bool {
        let mut guard = self.current.write();
        guard.dismissed_banners.insert(banner.to_string())
    }

    pub fn is_banner_dismissed(&self, banner: &str) -> bool {
        self.current.read().dismissed_banners.contains(banner)
    }

    /// Change team or workflow settings. Requires the settings permission.
    pub fn update_workflow(
        &self,
        user: &AuthUser,
        f: impl FnOnce(&mut TeamSettings, &mut WorkflowSettings),
    ) -> AppResult<ConsoleSettings> {
        ensure(user, Action::ManageSettings)?;
        Ok(self.update(|s| f(&mut s.team, &mut s.workflow)))
    }

    /// Write the current settings to the backing file.
    pub async fn persist(&self) -> Result<()> {
        let raw = toml::to_string_pretty(&self.get()).context("failed to encode settings")?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        tokio::fs::write(&self.path, raw)
            .await
            .with_context(|| format!("failed to write settings {}", self.path.display()))?;

        info!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::permissions::Role;
    use lingua_test_utils::TestDir;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = TestDir::new("settings_defaults");
        let provider = SettingsProvider::load(dir.join("settings.toml")).await.unwrap();
        let settings = provider.get();
        assert_eq!(settings.locale, Locale::Zh);
        assert!(settings.workflow.auto_slug);
        assert_eq!(settings.workflow.rule_set, RuleSet::Basic);
    }

    #[tokio::test]
    async fn persist_and_reload() {
        let dir = TestDir::new("settings_reload");
        let path = dir.join("nested").join("settings.toml");

        let provider = SettingsProvider::load(&path).await.unwrap();
        provider.set_locale(Locale::En);
        assert!(provider.dismiss_banner("welcome"));
        assert!(!provider.dismiss_banner("welcome"));
        let admin = AuthUser::new("a@example.com", Role::Admin);
        provider
            .update_workflow(&admin, |team, workflow| {
                team.name = "Medical Chinese".to_string();
                workflow.require_review = true;
                workflow.rule_set = RuleSet::Strict;
            })
            .unwrap();
        provider.persist().await.unwrap();

        let reloaded = SettingsProvider::load(&path).await.unwrap();
        assert_eq!(reloaded.get(), provider.get());
        assert!(reloaded.is_banner_dismissed("welcome"));
        assert_eq!(reloaded.workflow().rule_set, RuleSet::Strict);
    }

    #[test]
    fn workflow_changes_need_permission() {
        let provider = SettingsProvider::with_settings("unused.toml", ConsoleSettings::default());
        let editor = AuthUser::new("e@example.com", Role::Editor);
        let err = provider
            .update_workflow(&editor, |_, w| w.require_review = true)
            .unwrap_err();
        assert!(err.is_permission_denied());
        assert!(!provider.workflow().require_review);
    }

    #[test]
    fn locale_parsing() {
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("zh-CN".parse::<Locale>().unwrap(), Locale::Zh);
        assert!("fr".parse::<Locale>().is_err());
        assert_eq!(Locale::En.to_string(), "en");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let settings: ConsoleSettings = toml::from_str("locale = \"en\"\n[workflow]\nrequire_review = true\n").unwrap();
        assert_eq!(settings.locale, Locale::En);
        assert!(settings.workflow.require_review);
        assert!(settings.workflow.auto_slug);
    }
}
