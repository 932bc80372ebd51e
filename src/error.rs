//! Error types for the basketball-reference scraper

use thiserror::Error;


pub type Result<T> = std::result::Result<T, HoopsError>;

#[derive(Error, Debug)]
pub enum HoopsError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid date '{value}': {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Raised when a page cannot be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Failed to fetch {url} after {attempts} attempts")]
    Exhausted {
        url: String,
        attempts: u32,
        #[source]
        last: Option<reqwest::Error>,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Raised when fetched HTML does not have the expected table markup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No table found on the page")]
    NoTable,

    #[error("Expected column '{field}' not found. Tried: {tried}")]
    MissingColumn { field: String, tried: String },

    #[error("Invalid CSS selector '{selector}'")]
    Selector { selector: String },

    #[error("Season {season_id} has no schedule link")]
    NoScheduleLink { season_id: String },
}

/// Raised at startup when the environment does not describe a usable run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {var} is not set")]
    Missing { var: String },

    #[error("Environment variable {var} has invalid value '{value}': {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}
