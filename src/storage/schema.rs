//! Table definitions and SQL generation for both storage dialects

use crate::config::TableNames;
use std::fmt;

/// SQL flavour of the connected database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite => "?".to_string(),
        }
    }

    fn supports_schemas(self) -> bool {
        matches!(self, Dialect::Postgres)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    Date,
}

impl ColumnType {
    fn sql(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (ColumnType::Text, _) => "TEXT",
            (ColumnType::Integer, Dialect::Postgres) => "BIGINT",
            (ColumnType::Integer, Dialect::Sqlite) => "INTEGER",
            (ColumnType::Real, Dialect::Postgres) => "DOUBLE PRECISION",
            (ColumnType::Real, Dialect::Sqlite) => "REAL",
            (ColumnType::Date, Dialect::Postgres) => "DATE",
            // ISO-8601 text sorts and compares correctly
            (ColumnType::Date, Dialect::Sqlite) => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

const fn col(name: &'static str, ty: ColumnType, nullable: bool) -> Column {
    Column { name, ty, nullable }
}

/// What happens when an incoming row's key already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Keep the stored row.
    InsertIfAbsent,
    /// Overwrite every non-key column.
    Upsert,
}

/// The three persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Seasons,
    Schedules,
    Boxscores,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Seasons, TableKind::Schedules, TableKind::Boxscores];

    pub fn schema(self) -> &'static TableSchema {
        match self {
            TableKind::Seasons => &SEASONS,
            TableKind::Schedules => &SCHEDULES,
            TableKind::Boxscores => &BOXSCORES,
        }
    }

    /// Configured table name for this kind.
    pub fn table_name(self, tables: &TableNames) -> &str {
        match self {
            TableKind::Seasons => &tables.seasons,
            TableKind::Schedules => &tables.schedules,
            TableKind::Boxscores => &tables.boxscores,
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Seasons => "seasons",
            TableKind::Schedules => "schedules",
            TableKind::Boxscores => "boxscores",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Column order matches `Record::values`.
    pub columns: &'static [Column],
    /// Natural key; always the first column.
    pub key: &'static str,
    pub merge: MergePolicy,
}

use self::ColumnType::{Date, Integer, Real, Text};

pub static SEASONS: TableSchema = TableSchema {
    columns: &[
        col("season_id", Text, false),
        col("season", Text, false),
        col("season_url", Text, true),
        col("league", Text, false),
        col("league_url", Text, true),
        col("schedule_url", Text, true),
    ],
    key: "season_id",
    merge: MergePolicy::Upsert,
};

pub static SCHEDULES: TableSchema = TableSchema {
    columns: &[
        col("game_id", Text, false),
        col("season_id", Text, false),
        col("game_date", Date, false),
        col("home_team", Text, false),
        col("home_points", Integer, true),
        col("visitors_team", Text, false),
        col("visitors_points", Integer, true),
        col("overtime", Text, true),
        col("notes", Text, true),
        col("boxscore_url", Text, true),
        col("season", Text, false),
        col("league", Text, false),
        col("schedule_url", Text, true),
    ],
    key: "game_id",
    merge: MergePolicy::InsertIfAbsent,
};

pub static BOXSCORES: TableSchema = TableSchema {
    columns: &[
        col("boxscore_id", Text, false),
        col("game_id", Text, false),
        col("game_date", Date, false),
        col("team_role", Text, false),
        col("team", Text, false),
        col("player", Text, false),
        col("minutes_played", Text, true),
        col("field_goals_made", Integer, true),
        col("field_goals_attempted", Integer, true),
        col("field_goal_pct", Real, true),
        col("three_point_made", Integer, true),
        col("three_point_attempted", Integer, true),
        col("three_point_pct", Real, true),
        col("free_throws_made", Integer, true),
        col("free_throws_attempted", Integer, true),
        col("free_throw_pct", Real, true),
        col("offensive_rebounds", Integer, true),
        col("defensive_rebounds", Integer, true),
        col("total_rebounds", Integer, true),
        col("assists", Integer, true),
        col("steals", Integer, true),
        col("blocks", Integer, true),
        col("turnovers", Integer, true),
        col("personal_fouls", Integer, true),
        col("points", Integer, true),
        col("season", Text, false),
        col("league", Text, false),
        col("boxscore_url", Text, true),
    ],
    key: "boxscore_id",
    merge: MergePolicy::Upsert,
};

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"` for Postgres, `"table"` for SQLite.
pub fn qualified_name(dialect: Dialect, schema: &str, table: &str) -> String {
    if dialect.supports_schemas() && !schema.is_empty() {
        format!("{}.{}", quote_ident(schema), quote_ident(table))
    } else {
        quote_ident(table)
    }
}

pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema))
}

impl TableSchema {
    pub fn create_table_sql(&self, dialect: Dialect, table: &str) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", quote_ident(c.name), c.ty.sql(dialect));
                if c.name == self.key {
                    def.push_str(" PRIMARY KEY");
                } else if !c.nullable {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!("CREATE TABLE IF NOT EXISTS {} ({})", table, columns)
    }

    /// Single-row `INSERT … ON CONFLICT` statement following `self.merge`.
    pub fn merge_sql(&self, dialect: Dialect, table: &str) -> String {
        let names = self
            .columns
            .iter()
            .map(|c| quote_ident(c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=self.columns.len())
            .map(|i| dialect.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ");

        let on_conflict = match self.merge {
            MergePolicy::InsertIfAbsent => "DO NOTHING".to_string(),
            MergePolicy::Upsert => {
                let updates = self
                    .columns
                    .iter()
                    .filter(|c| c.name != self.key)
                    .map(|c| format!("{0} = excluded.{0}", quote_ident(c.name)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("DO UPDATE SET {}", updates)
            }
        };

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) {}",
            table,
            names,
            placeholders,
            quote_ident(self.key),
            on_conflict
        )
    }

    pub fn count_sql(&self, table: &str) -> String {
        format!("SELECT COUNT(*) FROM {}", table)
    }
}
