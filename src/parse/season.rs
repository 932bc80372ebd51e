//! International seasons index (`/international/years/`).

use super::{first_table, RawTable};
use crate::error::ParseError;

pub const SEASON_COLUMNS: &[&str] = &["Season"];
pub const LEAGUE_COLUMNS: &[&str] = &["League", "Leagues"];

/// Parse the seasons index into a table guaranteed to carry season and league columns.
pub fn parse_season_index(html: &str) -> Result<RawTable, ParseError> {
    let table = first_table(html)?;
    table.require_column(SEASON_COLUMNS, "Season")?;
    table.require_column(LEAGUE_COLUMNS, "League")?;
    Ok(table)
}
