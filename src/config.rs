use anyhow::{Context, Result};
use config::{Config, Environment, File};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://userbase.db?mode=rwc";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Application settings, layered from defaults, an optional `userbase.toml`
/// (or the file passed with `--config`) and `USERBASE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub log_level: String,
}

impl Settings {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        builder = match config_path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("userbase").required(false)),
        };

        let settings = builder
            .add_source(Environment::with_prefix("USERBASE"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize::<Settings>()
            .context("Invalid configuration")?;
        Ok(settings)
    }

    /// Applies a database URL given on the command line (or `DATABASE_URL`).
    pub fn with_database_url(mut self, database_url: Option<String>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        self
    }
}

/// Returns the file path of a SQLite database URL, or `None` for other
/// backends and in-memory databases.
pub fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path.contains(":memory:") {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Connects to the database, creating the parent directory of a SQLite file
/// first and enabling foreign key enforcement on SQLite.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(path) = sqlite_file_path(database_url) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            debug!("Ensuring database directory {} exists", parent.display());
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", database_url))?;

    if db.get_database_backend() == DbBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    }
    Ok(db)
}
