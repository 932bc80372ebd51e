//! Command implementations for the scraper

pub mod scrape;

#[cfg(test)]
mod tests;

pub use scrape::{handle_scrape, run_scrape, RunSummary, ScrapeParams};
