//! Canonical rows as ordered SQL values

use super::schema::TableKind;
use crate::models::{BoxscoreRow, ScheduleGame, Season};
use chrono::NaiveDate;
use rusqlite::types::{Null, ToSql, ToSqlOutput};

/// A nullable, typed column value shared by both backends.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Real(Option<f64>),
    Date(Option<NaiveDate>),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<&Option<String>> for SqlValue {
    fn from(v: &Option<String>) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(v: Option<i64>) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<Option<f64>> for SqlValue {
    fn from(v: Option<f64>) -> Self {
        SqlValue::Real(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(Some(v))
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Text(v) => v.to_sql(),
            SqlValue::Integer(v) => v.to_sql(),
            SqlValue::Real(v) => v.to_sql(),
            SqlValue::Date(Some(d)) => Ok(ToSqlOutput::from(d.format("%Y-%m-%d").to_string())),
            SqlValue::Date(None) => Ok(ToSqlOutput::from(Null)),
        }
    }
}

/// A row that can be merged into one of the persisted tables.
pub trait Record {
    const KIND: TableKind;

    fn key(&self) -> &str;

    /// Values in the column order of `Self::KIND.schema()`.
    fn values(&self) -> Vec<SqlValue>;
}

impl Record for Season {
    const KIND: TableKind = TableKind::Seasons;

    fn key(&self) -> &str {
        &self.season_id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.season_id.as_str().into(),
            self.season.as_str().into(),
            (&self.season_url).into(),
            self.league.as_str().into(),
            (&self.league_url).into(),
            (&self.schedule_url).into(),
        ]
    }
}

impl Record for ScheduleGame {
    const KIND: TableKind = TableKind::Schedules;

    fn key(&self) -> &str {
        &self.game_id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.game_id.as_str().into(),
            self.season_id.as_str().into(),
            self.game_date.into(),
            self.home_team.as_str().into(),
            self.home_points.into(),
            self.visitors_team.as_str().into(),
            self.visitors_points.into(),
            (&self.overtime).into(),
            (&self.notes).into(),
            (&self.boxscore_url).into(),
            self.season.as_str().into(),
            self.league.as_str().into(),
            (&self.schedule_url).into(),
        ]
    }
}

impl Record for BoxscoreRow {
    const KIND: TableKind = TableKind::Boxscores;

    fn key(&self) -> &str {
        &self.boxscore_id
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.boxscore_id.as_str().into(),
            self.game_id.as_str().into(),
            self.game_date.into(),
            self.team_role.as_str().into(),
            self.team.as_str().into(),
            self.player.as_str().into(),
            (&self.minutes_played).into(),
            self.field_goals_made.into(),
            self.field_goals_attempted.into(),
            self.field_goal_pct.into(),
            self.three_point_made.into(),
            self.three_point_attempted.into(),
            self.three_point_pct.into(),
            self.free_throws_made.into(),
            self.free_throws_attempted.into(),
            self.free_throw_pct.into(),
            self.offensive_rebounds.into(),
            self.defensive_rebounds.into(),
            self.total_rebounds.into(),
            self.assists.into(),
            self.steals.into(),
            self.blocks.into(),
            self.turnovers.into(),
            self.personal_fouls.into(),
            self.points.into(),
            self.season.as_str().into(),
            self.league.as_str().into(),
            (&self.boxscore_url).into(),
        ]
    }
}
