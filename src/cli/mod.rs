//! CLI argument definitions and parsing.

use crate::error::HoopsError;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(test)]
mod tests;

/// Which slice of the site a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Every season on the index, every game on each schedule.
    #[default]
    Full,
    /// Only games played on the target date.
    Daily,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Full => f.write_str("full"),
            RunMode::Daily => f.write_str("daily"),
        }
    }
}

#[derive(Debug, Parser)]
#[clap(
    name = "hoops-scrape",
    version,
    about = "Scrape basketball-reference seasons, schedules and boxscores into a database"
)]
pub struct Hoops {
    /// `full` refreshes every season; `daily` limits the scrape to one date.
    #[clap(long, value_enum, default_value_t = RunMode::Full)]
    pub mode: RunMode,

    /// YYYY-MM-DD date to filter schedules and boxscores to (daily mode defaults to today, UTC).
    #[clap(long, value_parser = parse_target_date)]
    pub target_date: Option<NaiveDate>,

    /// Only process the first N seasons of the index.
    #[clap(long)]
    pub max_seasons: Option<usize>,

    /// Print the run summary as JSON.
    #[clap(long)]
    pub json: bool,

    /// Log at debug level (RUST_LOG still wins).
    #[clap(long, short)]
    pub verbose: bool,
}

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_target_date(value: &str) -> Result<NaiveDate, HoopsError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|source| HoopsError::InvalidDate {
        value: value.to_string(),
        source,
    })
}
