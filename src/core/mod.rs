//! Core utilities for the scraper
//!
//! - `http`: rate-limited page fetching with retry and backoff
//! - `cache`: in-memory LRU cache of fetched pages

pub mod cache;
pub mod http;

pub use cache::PageCache;
pub use http::PageFetcher;
