//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

use crate::permissions::Role;

/// Which persistence backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Postgres when `DATABASE_URL` is set and reachable, local files otherwise.
    Auto,
    Memory,
    Local,
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "memory" => Ok(Self::Memory),
            "local" => Ok(Self::Local),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => bail!("unknown storage backend '{other}'"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend selection (default: auto).
    pub storage_backend: StorageBackend,

    /// PostgreSQL connection URL. When None, Postgres is not used.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Directory of the local JSON store (default: ./data).
    pub data_dir: PathBuf,

    /// Directory receiving exported JSON files (default: ./public/data).
    pub export_dir: PathBuf,

    /// Console settings file (default: ./console-settings.toml).
    pub settings_path: PathBuf,

    /// Email of the console operator.
    pub user_email: String,

    /// Role of the console operator (default: viewer).
    pub user_role: Role,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Auto,
            database_url: None,
            database_max_connections: 10,
            data_dir: PathBuf::from("./data"),
            export_dir: PathBuf::from("./public/data"),
            settings_path: PathBuf::from("./console-settings.toml"),
            user_email: "console@localhost".to_string(),
            user_role: Role::Viewer,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let storage_backend = env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "auto".to_string())
            .parse()
            .context("STORAGE_BACKEND must be one of auto, memory, local, postgres")?;

        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let export_dir = env::var("EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        let settings_path = env::var("SETTINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.settings_path);

        let user_email = env::var("CONSOLE_USER_EMAIL").unwrap_or(defaults.user_email);

        let user_role = env::var("CONSOLE_USER_ROLE")
            .unwrap_or_else(|_| "viewer".to_string())
            .parse::<Role>()
            .map_err(|e| anyhow::anyhow!("CONSOLE_USER_ROLE: {e}"))?;

        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("STORAGE_BACKEND=postgres requires DATABASE_URL");
        }

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections,
            data_dir,
            export_dir,
            settings_path,
            user_email,
            user_role,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn backend_parsing() {
        assert_eq!("AUTO".parse::<StorageBackend>().unwrap(), StorageBackend::Auto);
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(
            "postgresql".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn defaults_are_read_only_local() {
        let config = Config::default();
        assert_eq!(config.storage_backend, StorageBackend::Auto);
        assert_eq!(config.user_role, Role::Viewer);
        assert!(config.database_url.is_none());
    }
}
