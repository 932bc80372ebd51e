//! League schedule pages (`<league>/<year>-schedule.html`).

use super::{first_table, RawTable};
use crate::error::ParseError;

pub const DATE_COLUMNS: &[&str] = &["Date"];

/// Parse a schedule page. The first table must have a `Date` column.
pub fn parse_schedule(html: &str) -> Result<RawTable, ParseError> {
    let table = first_table(html)?;
    table.require_column(DATE_COLUMNS, "Date")?;
    Ok(table)
}
