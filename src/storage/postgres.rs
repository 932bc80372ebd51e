//! PostgreSQL backend over a single-connection `sqlx` pool.

use super::record::{Record, SqlValue};
use super::schema::{create_schema_sql, qualified_name, Dialect, TableKind};
use crate::config::TableNames;
use anyhow::{Context, Result};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::Postgres;
use std::time::Duration;
use tracing::debug;

type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

pub struct PgStore {
    pub(crate) pool: PgPool,
    schema: String,
    tables: TableNames,
}

impl PgStore {
    /// Connect, then create the schema and tables if they are missing.
    pub async fn connect(
        url: &str,
        schema: &str,
        tables: TableNames,
        timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(timeout)
            .connect(url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        let store = Self {
            pool,
            schema: schema.to_string(),
            tables,
        };
        store.initialize_schema().await?;
        Ok(store)
    }

    fn table(&self, kind: TableKind) -> String {
        qualified_name(Dialect::Postgres, &self.schema, kind.table_name(&self.tables))
    }

    async fn initialize_schema(&self) -> Result<()> {
        if !self.schema.is_empty() {
            sqlx::query(&create_schema_sql(&self.schema))
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to create schema {}", self.schema))?;
        }

        for kind in TableKind::ALL {
            let sql = kind.schema().create_table_sql(Dialect::Postgres, &self.table(kind));
            sqlx::query(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to create {} table", kind))?;
        }
        Ok(())
    }

    /// Merge `rows` in one transaction; returns the number of rows changed.
    pub async fn merge<R: Record>(&self, rows: &[R]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let sql = R::KIND.schema().merge_sql(Dialect::Postgres, &self.table(R::KIND));
        let mut tx = self.pool.begin().await?;
        let mut changed = 0;

        for row in rows {
            let query = row
                .values()
                .into_iter()
                .fold(sqlx::query(&sql), bind_value);
            let result = query
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to write {} row {}", R::KIND, row.key()))?;
            changed += result.rows_affected() as usize;
        }
        tx.commit().await?;

        debug!(table = %R::KIND, rows = rows.len(), changed, "Merged into PostgreSQL");
        Ok(changed)
    }

    pub async fn row_count(&self, kind: TableKind) -> Result<i64> {
        let sql = kind.schema().count_sql(&self.table(kind));
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn bind_value(query: PgQuery<'_>, value: SqlValue) -> PgQuery<'_> {
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Integer(v) => query.bind(v),
        SqlValue::Real(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
    }
}
