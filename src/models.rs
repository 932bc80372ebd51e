//! Canonical rows written to storage.
//!
//! These types are independent of the page layout they were scraped from.
//! Each carries a natural key derived from domain values so that repeated
//! runs merge into the same rows instead of duplicating them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A league season listed on the international seasons index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub season_id: String,
    pub season: String,
    pub season_url: Option<String>,
    pub league: String,
    pub league_url: Option<String>,
    pub schedule_url: Option<String>,
}

impl Season {
    /// Year the season ends in, e.g. `2025` for `2024-25`.
    ///
    /// Taken from the season page URL (`.../2025.html`) when present, otherwise
    /// from the season label.
    pub fn end_year(&self) -> Option<i32> {
        self.season_url
            .as_deref()
            .and_then(year_from_url)
            .or_else(|| year_from_label(&self.season))
    }

    /// Whether games on `date` can belong to this season.
    ///
    /// Seasons straddle the new year, so a date in year `Y` belongs either to
    /// the season ending in `Y` or the one ending in `Y + 1`.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;

        match self.end_year() {
            Some(end) => end == date.year() || end == date.year() + 1,
            None => false,
        }
    }
}

/// One scheduled (or played) game from a league schedule page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleGame {
    pub game_id: String,
    pub season_id: String,
    pub game_date: NaiveDate,
    pub home_team: String,
    pub home_points: Option<i64>,
    pub visitors_team: String,
    pub visitors_points: Option<i64>,
    pub overtime: Option<String>,
    pub notes: Option<String>,
    pub boxscore_url: Option<String>,
    pub season: String,
    pub league: String,
    pub schedule_url: Option<String>,
}

/// Which side of the game a boxscore table describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamRole {
    Home,
    Visitors,
}

impl TeamRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Home => "Home",
            TeamRole::Visitors => "Visitors",
        }
    }
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single player's stat line for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxscoreRow {
    pub boxscore_id: String,
    pub game_id: String,
    pub game_date: NaiveDate,
    pub team_role: TeamRole,
    pub team: String,
    pub player: String,
    pub minutes_played: Option<String>,
    pub field_goals_made: Option<i64>,
    pub field_goals_attempted: Option<i64>,
    pub field_goal_pct: Option<f64>,
    pub three_point_made: Option<i64>,
    pub three_point_attempted: Option<i64>,
    pub three_point_pct: Option<f64>,
    pub free_throws_made: Option<i64>,
    pub free_throws_attempted: Option<i64>,
    pub free_throw_pct: Option<f64>,
    pub offensive_rebounds: Option<i64>,
    pub defensive_rebounds: Option<i64>,
    pub total_rebounds: Option<i64>,
    pub assists: Option<i64>,
    pub steals: Option<i64>,
    pub blocks: Option<i64>,
    pub turnovers: Option<i64>,
    pub personal_fouls: Option<i64>,
    pub points: Option<i64>,
    pub season: String,
    pub league: String,
    pub boxscore_url: Option<String>,
}

/// Build a natural key from its parts.
///
/// Each part is reduced to lowercase ASCII alphanumerics with every other run
/// of characters collapsed into a single `-`; parts are joined with `_`.
pub fn natural_key<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| slug(part.as_ref()))
        .collect::<Vec<_>>()
        .join("_")
}

pub fn season_key(league: &str, season: &str) -> String {
    natural_key(&[league, season])
}

pub fn game_key(date: NaiveDate, home: &str, visitors: &str, league: &str) -> String {
    let date = date.format("%Y-%m-%d").to_string();
    natural_key(&[date.as_str(), home, visitors, league])
}

pub fn boxscore_key(game_id: &str, team: &str, player: &str) -> String {
    format!("{}_{}", game_id, natural_key(&[team, player]))
}

fn slug(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Four-digit year right before the `.html` / `.htm` extension.
pub(crate) fn year_from_url(url: &str) -> Option<i32> {
    let stem = url
        .strip_suffix(".html")
        .or_else(|| url.strip_suffix(".htm"))?;
    let digits = stem.get(stem.len().checked_sub(4)?..)?;
    if digits.chars().all(|c| c.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn year_from_label(label: &str) -> Option<i32> {
    let start: i32 = label.get(..4)?.parse().ok()?;
    if label[4..].trim_start().starts_with('-') {
        Some(start + 1)
    } else {
        Some(start)
    }
}
