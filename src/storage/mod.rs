//! Storage layer for scraped basketball data
//!
//! - `schema`: table definitions and SQL generation for both dialects
//! - `record`: canonical rows as ordered SQL values
//! - `postgres`: primary backend over `sqlx`
//! - `sqlite`: embedded backend over `rusqlite`, also the fallback
//!
//! [`Store::connect`] tries the configured database first. When that fails it
//! logs a warning and opens the local fallback file instead, so a run can
//! still complete while the primary is down.

pub mod postgres;
pub mod record;
pub mod schema;
pub mod sqlite;


pub use postgres::PgStore;
pub use record::{Record, SqlValue};
pub use schema::{Dialect, MergePolicy, TableKind, TableSchema};
pub use sqlite::SqliteStore;

use crate::config::{redact_url, DatabaseConfig, TableNames};
use crate::models::{BoxscoreRow, ScheduleGame, Season};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const SQLITE_MEMORY: &str = ":memory:";

pub enum Backend {
    Postgres(PgStore),
    Sqlite(SqliteStore),
}

/// Open database handle for one run.
pub struct Store {
    backend: Backend,
    fallback: bool,
    location: String,
}

impl Store {
    /// Connect to the configured database, falling back to the local SQLite
    /// file when the primary cannot be reached or initialised.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        if let Some(path) = sqlite_path(&config.url) {
            return Self::open_sqlite(&path, config.tables.clone());
        }

        if !is_postgres_url(&config.url) {
            bail!("Unsupported database URL {}", redact_url(&config.url));
        }

        match PgStore::connect(
            &config.url,
            &config.schema,
            config.tables.clone(),
            config.connect_timeout,
        )
        .await
        {
            Ok(store) => {
                let location = redact_url(&config.url);
                info!(database = %location, schema = %config.schema, "Connected to PostgreSQL");
                Ok(Self {
                    backend: Backend::Postgres(store),
                    fallback: false,
                    location,
                })
            }
            Err(e) => {
                warn!(
                    database = %redact_url(&config.url),
                    fallback = %config.fallback_path.display(),
                    error = %format!("{:#}", e),
                    "Primary database unavailable, writing to local SQLite fallback"
                );
                let mut store = Self::open_sqlite(&config.fallback_path, config.tables.clone())
                    .context("Fallback SQLite database could not be opened")?;
                store.fallback = true;
                Ok(store)
            }
        }
    }

    /// Open an SQLite file directly (`:memory:` for an in-memory database).
    pub fn open_sqlite(path: &Path, tables: TableNames) -> Result<Self> {
        let store = if path.as_os_str() == SQLITE_MEMORY {
            SqliteStore::open_in_memory(tables)?
        } else {
            SqliteStore::open(path, tables)?
        };
        info!(path = %path.display(), "Opened SQLite database");
        Ok(Self {
            backend: Backend::Sqlite(store),
            fallback: false,
            location: path.display().to_string(),
        })
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn dialect(&self) -> Dialect {
        match self.backend {
            Backend::Postgres(_) => Dialect::Postgres,
            Backend::Sqlite(_) => Dialect::Sqlite,
        }
    }

    /// Whether this store is the fallback file rather than the configured database.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Redacted database URL or SQLite file path.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn merge<R: Record>(&mut self, rows: &[R]) -> Result<usize> {
        match &mut self.backend {
            Backend::Postgres(store) => store.merge(rows).await,
            Backend::Sqlite(store) => store.merge(rows),
        }
    }

    /// Upsert seasons.
    pub async fn save_seasons(&mut self, seasons: &[Season]) -> Result<usize> {
        self.merge(seasons).await
    }

    /// Insert schedule games whose key is not stored yet; returns how many were new.
    pub async fn save_schedule_games(&mut self, games: &[ScheduleGame]) -> Result<usize> {
        self.merge(games).await
    }

    /// Upsert player stat lines.
    pub async fn save_boxscores(&mut self, rows: &[BoxscoreRow]) -> Result<usize> {
        self.merge(rows).await
    }

    pub async fn row_count(&self, kind: TableKind) -> Result<i64> {
        match &self.backend {
            Backend::Postgres(store) => store.row_count(kind).await,
            Backend::Sqlite(store) => store.row_count(kind),
        }
    }
}

/// Path of a `sqlite:` URL (`sqlite:path`, `sqlite://path`, `sqlite::memory:`).
pub fn sqlite_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let rest = rest.split('?').next().unwrap_or(rest);
    Some(PathBuf::from(rest))
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}
