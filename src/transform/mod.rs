//! Raw tables to canonical rows.
//!
//! Everything here is pure: no I/O, and the same input always yields the same
//! rows. Values that fail to parse become `None`; only rows that cannot carry
//! a natural key are dropped.


use crate::models::{
    boxscore_key, game_key, season_key, BoxscoreRow, ScheduleGame, Season, TeamRole,
};
use crate::parse::{
    schedule::DATE_COLUMNS,
    season::{LEAGUE_COLUMNS, SEASON_COLUMNS},
    BoxscoreTables, Cell, RawTable,
};
use chrono::NaiveDate;
use reqwest::Url;

const HOME_COLUMNS: &[&str] = &["Team", "Home", "Home/Neutral"];
const VISITOR_COLUMNS: &[&str] = &["Opp", "Visitors", "Visitor/Neutral"];
const POINTS_PREFIX: &str = "PTS";
const OVERTIME_COLUMNS: &[&str] = &["OT", "OT?"];
const NOTES_COLUMNS: &[&str] = &["Notes"];

const PLAYER_COLUMNS: &[&str] = &["Player", "Starters"];
const TEAM_TOTALS: &str = "Team Totals";

const DATE_FORMATS: &[&str] = &[
    "%a, %b %d, %Y",
    "%a, %B %d, %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y-%m-%d",
    "%d.%m.%Y",
];

/// Build seasons from the seasons index table.
///
/// Rows without a season label or league name are dropped.
pub fn seasons(table: &RawTable, base_url: &Url) -> Vec<Season> {
    let season_col = table.column_index(SEASON_COLUMNS);
    let league_col = table.column_index(LEAGUE_COLUMNS);

    table
        .rows
        .iter()
        .filter_map(|row| {
            let season_cell = season_col.and_then(|i| row.get(i))?;
            let league_cell = league_col.and_then(|i| row.get(i))?;
            let season = non_empty(&season_cell.text)?;
            let league = non_empty(&league_cell.text)?;

            let season_url = absolute_href(base_url, season_cell);
            let league_url = absolute_href(base_url, league_cell);
            let schedule_url = schedule_url(season_url.as_deref(), league_url.as_deref());

            Some(Season {
                season_id: season_key(&league, &season),
                season,
                season_url,
                league,
                league_url,
                schedule_url,
            })
        })
        .collect()
}

/// `<league dir>/<year>-schedule.html`, where the year comes from the season
/// page URL and the league directory is the league URL minus any `*.html` page.
pub fn schedule_url(season_url: Option<&str>, league_url: Option<&str>) -> Option<String> {
    let year = season_url.and_then(crate::models::year_from_url)?;
    let league_url = league_url?.trim_end_matches('/');
    let dir = if league_url.ends_with(".html") {
        league_url.rsplit_once('/').map(|(dir, _)| dir)?
    } else {
        league_url
    };
    Some(format!("{}/{}-schedule.html", dir, year))
}

/// Build games from a league schedule table.
///
/// Month separator rows and rows without a parseable date or without both
/// team names are dropped.
pub fn schedule_games(table: &RawTable, season: &Season, base_url: &Url) -> Vec<ScheduleGame> {
    let date_col = table.column_index(DATE_COLUMNS);
    let home_col = table.column_index(HOME_COLUMNS);
    let visitor_col = table.column_index(VISITOR_COLUMNS);
    let home_pts_col = points_column(table, home_col);
    let visitor_pts_col = points_column(table, visitor_col);
    let ot_col = table.column_index(OVERTIME_COLUMNS);
    let notes_col = table.column_index(NOTES_COLUMNS);

    table
        .rows
        .iter()
        .filter_map(|row| {
            let cell = |col: Option<usize>| col.and_then(|i| row.get(i));
            let text = |col: Option<usize>| cell(col).and_then(|c| non_empty(&c.text));

            let date_cell = cell(date_col)?;
            let game_date = parse_game_date(&date_cell.text)?;
            let home_team = text(home_col)?;
            let visitors_team = text(visitor_col)?;

            Some(ScheduleGame {
                game_id: game_key(game_date, &home_team, &visitors_team, &season.league),
                season_id: season.season_id.clone(),
                game_date,
                home_points: text(home_pts_col).and_then(|v| parse_int(&v)),
                visitors_points: text(visitor_pts_col).and_then(|v| parse_int(&v)),
                overtime: text(ot_col),
                notes: text(notes_col),
                boxscore_url: absolute_href(base_url, date_cell),
                home_team,
                visitors_team,
                season: season.season.clone(),
                league: season.league.clone(),
                schedule_url: season.schedule_url.clone(),
            })
        })
        .collect()
}

/// The score column sits right after its team column, whichever side is listed first.
fn points_column(table: &RawTable, team_col: Option<usize>) -> Option<usize> {
    let col = team_col? + 1;
    table
        .headers
        .get(col)
        .filter(|h| h.starts_with(POINTS_PREFIX))
        .map(|_| col)
}

/// Keep exactly the games played on `date`.
pub fn filter_by_date(games: Vec<ScheduleGame>, date: NaiveDate) -> Vec<ScheduleGame> {
    games.into_iter().filter(|g| g.game_date == date).collect()
}

/// Build per-player stat lines for `game` from its boxscore tables.
///
/// The visitor table is attributed to the visiting team and the home table to
/// the home team. Rows without a player name and team total rows are dropped.
pub fn boxscore_rows(tables: &BoxscoreTables, game: &ScheduleGame) -> Vec<BoxscoreRow> {
    [
        (TeamRole::Visitors, game.visitors_team.as_str()),
        (TeamRole::Home, game.home_team.as_str()),
    ]
    .into_iter()
    .filter_map(|(role, team)| tables.get(role).map(|table| (role, team, table)))
    .flat_map(|(role, team, table)| team_rows(table, role, team, game))
    .collect()
}

fn team_rows(table: &RawTable, role: TeamRole, team: &str, game: &ScheduleGame) -> Vec<BoxscoreRow> {
    let player_col = table.column_index(PLAYER_COLUMNS);
    let col = |name: &str| table.column_index(&[name]);
    let columns = StatColumns {
        minutes: col("MP"),
        fg: col("FG"),
        fga: col("FGA"),
        fg_pct: col("FG%"),
        three: col("3P"),
        three_a: col("3PA"),
        three_pct: col("3P%"),
        ft: col("FT"),
        fta: col("FTA"),
        ft_pct: col("FT%"),
        orb: col("ORB"),
        drb: col("DRB"),
        trb: col("TRB"),
        ast: col("AST"),
        stl: col("STL"),
        blk: col("BLK"),
        tov: col("TOV"),
        pf: col("PF"),
        pts: col("PTS"),
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let text = |col: Option<usize>| col.and_then(|i| row.get(i)).and_then(|c| non_empty(&c.text));
            let int = |col: Option<usize>| text(col).and_then(|v| parse_int(&v));
            let real = |col: Option<usize>| text(col).and_then(|v| parse_real(&v));

            let player = text(player_col)?;
            if player == TEAM_TOTALS {
                return None;
            }

            Some(BoxscoreRow {
                boxscore_id: boxscore_key(&game.game_id, team, &player),
                game_id: game.game_id.clone(),
                game_date: game.game_date,
                team_role: role,
                team: team.to_string(),
                minutes_played: text(columns.minutes).filter(|v| looks_like_minutes(v)),
                field_goals_made: int(columns.fg),
                field_goals_attempted: int(columns.fga),
                field_goal_pct: real(columns.fg_pct),
                three_point_made: int(columns.three),
                three_point_attempted: int(columns.three_a),
                three_point_pct: real(columns.three_pct),
                free_throws_made: int(columns.ft),
                free_throws_attempted: int(columns.fta),
                free_throw_pct: real(columns.ft_pct),
                offensive_rebounds: int(columns.orb),
                defensive_rebounds: int(columns.drb),
                total_rebounds: int(columns.trb),
                assists: int(columns.ast),
                steals: int(columns.stl),
                blocks: int(columns.blk),
                turnovers: int(columns.tov),
                personal_fouls: int(columns.pf),
                points: int(columns.pts),
                player,
                season: game.season.clone(),
                league: game.league.clone(),
                boxscore_url: game.boxscore_url.clone(),
            })
        })
        .collect()
}

struct StatColumns {
    minutes: Option<usize>,
    fg: Option<usize>,
    fga: Option<usize>,
    fg_pct: Option<usize>,
    three: Option<usize>,
    three_a: Option<usize>,
    three_pct: Option<usize>,
    ft: Option<usize>,
    fta: Option<usize>,
    ft_pct: Option<usize>,
    orb: Option<usize>,
    drb: Option<usize>,
    trb: Option<usize>,
    ast: Option<usize>,
    stl: Option<usize>,
    blk: Option<usize>,
    tov: Option<usize>,
    pf: Option<usize>,
    pts: Option<usize>,
}

/// Parse a schedule date cell; `None` for separators such as `November`.
pub fn parse_game_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub(crate) fn parse_int(value: &str) -> Option<i64> {
    value.trim().trim_start_matches('+').parse().ok()
}

pub(crate) fn parse_real(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn looks_like_minutes(value: &str) -> bool {
    value.contains(':') || parse_real(value).is_some()
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn absolute_href(base_url: &Url, cell: &Cell) -> Option<String> {
    let href = cell.href.as_deref().map(str::trim).filter(|h| !h.is_empty())?;
    base_url.join(href).ok().map(String::from)
}
