//! Embedded SQLite backend, used directly for `sqlite:` URLs and as the
//! fallback when the primary database is unreachable.

use super::record::Record;
use super::schema::{qualified_name, Dialect, TableKind};
use crate::config::TableNames;
use anyhow::{Context, Result};
use rusqlite::{params_from_iter, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SqliteStore {
    pub(crate) conn: Connection,
    tables: TableNames,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path` and ensure tables exist.
    pub fn open(path: &Path, tables: TableNames) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        let mut store = Self {
            conn,
            tables,
            path: Some(path.to_path_buf()),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn open_in_memory(tables: TableNames) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self {
            conn,
            tables,
            path: None,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn table(&self, kind: TableKind) -> String {
        qualified_name(Dialect::Sqlite, "", kind.table_name(&self.tables))
    }

    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        for kind in TableKind::ALL {
            let sql = kind.schema().create_table_sql(Dialect::Sqlite, &self.table(kind));
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create {} table", kind))?;
        }
        Ok(())
    }

    /// Merge `rows` in one transaction; returns the number of rows changed.
    pub fn merge<R: Record>(&mut self, rows: &[R]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = R::KIND.schema().merge_sql(Dialect::Sqlite, &self.table(R::KIND));
        let tx = self.conn.transaction()?;
        let mut changed = 0;
        {
            let mut stmt = tx.prepare(&sql)?;
            for row in rows {
                changed += stmt
                    .execute(params_from_iter(row.values()))
                    .with_context(|| format!("Failed to write {} row {}", R::KIND, row.key()))?;
            }
        }
        tx.commit()?;

        debug!(table = %R::KIND, rows = rows.len(), changed, "Merged into SQLite");
        Ok(changed)
    }

    pub fn row_count(&self, kind: TableKind) -> Result<i64> {
        let sql = kind.schema().count_sql(&self.table(kind));
        let count = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}
