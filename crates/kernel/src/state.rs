//! Application state shared by the console's commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::{Config, StorageBackend};
use crate::db;
use crate::export::Exporter;
use crate::import::Importer;
use crate::models::{AuthUser, ContentRecord};
use crate::settings::{ConsoleSettings, SettingsProvider};
use crate::storage::{ContentStore, LocalStore, MemoryStore, PgStore, Repository};
use crate::versions::VersionService;
use crate::workflow::PublishService;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The storage backend chosen at startup.
    store: Arc<dyn ContentStore>,

    /// Console settings.
    settings: Arc<SettingsProvider>,

    /// The operator running this console session.
    user: AuthUser,

    versions: VersionService,
    exporter: Exporter,
    importer: Importer,
}

impl AppState {
    /// Create application state, choosing the storage backend from `config`.
    pub async fn new(config: &Config) -> Result<Self> {
        let store = open_store(config).await?;
        let settings = SettingsProvider::load(&config.settings_path)
            .await
            .context("failed to load console settings")?;

        let user = AuthUser::new(config.user_email.clone(), config.user_role);
        info!(
            backend = store.backend_name(),
            email = %user.email,
            role = %user.role,
            "console state initialized"
        );

        Ok(Self::from_parts(store, Arc::new(settings), user))
    }

    /// State over an in-memory store with default settings.
    pub fn in_memory(user: AuthUser) -> Self {
        let settings = SettingsProvider::with_settings(
            "console-settings.toml",
            ConsoleSettings::default(),
        );
        Self::from_parts(Arc::new(MemoryStore::new()), Arc::new(settings), user)
    }

    /// Assemble state from an already opened store and settings.
    pub fn from_parts(
        store: Arc<dyn ContentStore>,
        settings: Arc<SettingsProvider>,
        user: AuthUser,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                versions: VersionService::new(Arc::clone(&store)),
                exporter: Exporter::new(Arc::clone(&store)),
                importer: Importer::new(Arc::clone(&store), Arc::clone(&settings)),
                store,
                settings,
                user,
            }),
        }
    }

    /// Get the storage backend.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.inner.store
    }

    /// Get the settings provider.
    pub fn settings(&self) -> &Arc<SettingsProvider> {
        &self.inner.settings
    }

    /// The console operator.
    pub fn user(&self) -> &AuthUser {
        &self.inner.user
    }

    /// Get the version service.
    pub fn versions(&self) -> &VersionService {
        &self.inner.versions
    }

    pub fn exporter(&self) -> &Exporter {
        &self.inner.exporter
    }

    pub fn importer(&self) -> &Importer {
        &self.inner.importer
    }

    /// Typed repository for one record type.
    pub fn repository<T: ContentRecord>(&self) -> Repository<T> {
        Repository::new(Arc::clone(&self.inner.store))
    }

    /// Publishing workflow for one record type.
    pub fn publisher<T: ContentRecord>(&self) -> PublishService<T> {
        PublishService::new(
            Arc::clone(&self.inner.store),
            Arc::clone(&self.inner.settings),
        )
    }
}

/// Open the configured backend.
///
/// `auto` prefers Postgres and falls back to the local JSON store when no
/// database is configured or it cannot be reached.
async fn open_store(config: &Config) -> Result<Arc<dyn ContentStore>> {
    match config.storage_backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Local => Ok(Arc::new(LocalStore::open(&config.data_dir).await?)),
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            Ok(Arc::new(open_postgres(url, config).await?))
        }
        StorageBackend::Auto => {
            if let Some(url) = config.database_url.as_deref() {
                match open_postgres(url, config).await {
                    Ok(store) => return Ok(Arc::new(store)),
                    Err(e) => {
                        warn!(error = %e, "database unavailable, falling back to local storage");
                    }
                }
            } else {
                warn!("DATABASE_URL not set, using local storage");
            }
            Ok(Arc::new(LocalStore::open(&config.data_dir).await?))
        }
    }
}

async fn open_postgres(url: &str, config: &Config) -> Result<PgStore> {
    let pool = db::create_pool(url, config.database_max_connections).await?;
    if !db::check_health(&pool).await {
        anyhow::bail!("database health check failed");
    }
    PgStore::new(pool).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::permissions::Role;
    use lingua_test_utils::TestDir;

    #[tokio::test]
    async fn auto_without_database_uses_local_store() {
        let dir = TestDir::new("state_auto");
        let config = Config {
            data_dir: dir.join("data"),
            settings_path: dir.join("settings.toml"),
            user_role: Role::Editor,
            ..Config::default()
        };

        let state = AppState::new(&config).await.unwrap();
        assert_eq!(state.store().backend_name(), "local");
        assert_eq!(state.user().role, Role::Editor);
    }

    #[tokio::test]
    async fn memory_backend() {
        let dir = TestDir::new("state_memory");
        let config = Config {
            storage_backend: StorageBackend::Memory,
            settings_path: dir.join("settings.toml"),
            ..Config::default()
        };

        let state = AppState::new(&config).await.unwrap();
        assert_eq!(state.store().backend_name(), "memory");
    }
}
