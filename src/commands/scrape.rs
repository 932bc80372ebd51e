//! Scrape pipeline: season index, schedules, boxscores, storage.
//!
//! A run walks the site top-down. The season index must load; without it
//! there is nothing to do and the run fails. Every page below it is
//! best-effort: a schedule or boxscore page that cannot be fetched or parsed
//! is logged, counted in the [`RunSummary`] and skipped.
//!
//! # Modes
//!
//! - [`RunMode::Full`] stores every season, appends every schedule row and
//!   upserts the boxscores of every listed game. With a target date the
//!   schedule is filtered to that date first.
//! - [`RunMode::Daily`] only visits seasons that can contain the target date,
//!   keeps the games played on it and fetches just those boxscores. Seasons
//!   are not re-stored.

use crate::{
    cli::RunMode,
    config::AppConfig,
    core::{PageCache, PageFetcher},
    error::{HoopsError, ParseError},
    models::{ScheduleGame, Season},
    parse::{parse_boxscore, parse_schedule, parse_season_index, BoxscoreTables},
    storage::{Dialect, Store},
    transform, Result,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options for one scrape run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeParams {
    pub mode: RunMode,
    /// Daily mode uses today's UTC date when unset.
    pub target_date: Option<NaiveDate>,
    /// Only process the first N seasons listed on the index.
    pub max_seasons: Option<usize>,
}

impl ScrapeParams {
    /// Date the schedule is filtered to, if any.
    pub fn resolve_target_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self.mode {
            RunMode::Full => self.target_date,
            RunMode::Daily => Some(self.target_date.unwrap_or(today)),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub target_date: Option<NaiveDate>,
    /// `postgres` or `sqlite`.
    pub storage_backend: String,
    pub storage_location: String,
    pub used_fallback: bool,
    pub seasons_found: usize,
    pub seasons_selected: usize,
    pub seasons_stored: usize,
    pub schedule_pages_failed: usize,
    pub schedule_games_scraped: usize,
    pub schedule_games_stored: usize,
    pub boxscore_pages_fetched: usize,
    /// Distinct boxscore pages that could not be fetched or parsed.
    pub boxscore_pages_failed: usize,
    /// Games skipped because their boxscore page failed.
    pub games_boxscore_failed: usize,
    pub games_without_boxscore: usize,
    pub boxscore_rows_stored: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .target_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "all dates".to_string());
        writeln!(f, "Mode: {} ({})", self.mode, date)?;
        write!(f, "Storage: {} at {}", self.storage_backend, self.storage_location)?;
        if self.used_fallback {
            write!(f, " (fallback)")?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Seasons: {} found, {} selected, {} stored",
            self.seasons_found, self.seasons_selected, self.seasons_stored
        )?;
        writeln!(
            f,
            "Schedule: {} games scraped, {} new, {} pages failed",
            self.schedule_games_scraped, self.schedule_games_stored, self.schedule_pages_failed
        )?;
        write!(
            f,
            "Boxscores: {} pages fetched, {} failed ({} games), {} games without link, {} rows stored",
            self.boxscore_pages_fetched,
            self.boxscore_pages_failed,
            self.games_boxscore_failed,
            self.games_without_boxscore,
            self.boxscore_rows_stored
        )
    }
}

type BoxscorePage = std::result::Result<Arc<BoxscoreTables>, Arc<HoopsError>>;

/// Load configuration-driven resources and run the scrape.
pub async fn handle_scrape(config: &AppConfig, params: ScrapeParams) -> Result<RunSummary> {
    let fetcher = PageFetcher::new(&config.scraper)?;
    let mut store = Store::connect(&config.database).await?;
    run_scrape(&fetcher, &mut store, &params).await
}

/// Run the pipeline against an already-open store.
pub async fn run_scrape(
    fetcher: &PageFetcher,
    store: &mut Store,
    params: &ScrapeParams,
) -> Result<RunSummary> {
    let target_date = params.resolve_target_date(Utc::now().date_naive());
    let mut summary = RunSummary {
        mode: params.mode,
        target_date,
        storage_backend: match store.dialect() {
            Dialect::Postgres => "postgres".to_string(),
            Dialect::Sqlite => "sqlite".to_string(),
        },
        storage_location: store.location().to_string(),
        used_fallback: store.is_fallback(),
        ..RunSummary::default()
    };

    info!(
        mode = %params.mode,
        target_date = ?target_date,
        storage = %summary.storage_backend,
        fallback = summary.used_fallback,
        "Starting scrape"
    );

    let seasons = fetch_seasons(fetcher).await?;
    summary.seasons_found = seasons.len();

    let selected = select_seasons(seasons, params.mode, target_date, params.max_seasons);
    summary.seasons_selected = selected.len();
    info!(found = summary.seasons_found, selected = selected.len(), "Seasons selected");

    if params.mode == RunMode::Full {
        summary.seasons_stored = store.save_seasons(&selected).await?;
    }

    let mut games = Vec::new();
    for season in &selected {
        match fetch_schedule(fetcher, season).await {
            Ok(season_games) => {
                debug!(season = %season.season_id, games = season_games.len(), "Schedule parsed");
                games.extend(season_games);
            }
            Err(e) => {
                warn!(season = %season.season_id, error = %e, "Skipping schedule");
                summary.schedule_pages_failed += 1;
            }
        }
    }

    if let Some(date) = target_date {
        let before = games.len();
        games = transform::filter_by_date(games, date);
        info!(date = %date, kept = games.len(), before, "Filtered schedule");
    }

    summary.schedule_games_scraped = games.len();
    summary.schedule_games_stored = store.save_schedule_games(&games).await?;

    let mut pages: PageCache<BoxscorePage> = PageCache::default();
    for game in &games {
        let Some(url) = game.boxscore_url.as_deref() else {
            debug!(game = %game.game_id, "No boxscore link");
            summary.games_without_boxscore += 1;
            continue;
        };

        let (_, misses) = pages.stats();
        let page = pages
            .get_or_insert_with(url, || fetch_boxscore(fetcher, url))
            .await;
        let fetched = pages.stats().1 > misses;

        match page {
            Ok(tables) => {
                let rows = transform::boxscore_rows(&tables, game);
                summary.boxscore_rows_stored += store.save_boxscores(&rows).await?;
                debug!(game = %game.game_id, rows = rows.len(), "Boxscore stored");
            }
            Err(e) => {
                warn!(game = %game.game_id, url, error = %e, "Skipping boxscore");
                summary.games_boxscore_failed += 1;
                if fetched {
                    summary.boxscore_pages_failed += 1;
                }
            }
        }
    }
    summary.boxscore_pages_fetched = pages.stats().1;

    info!(
        seasons = summary.seasons_stored,
        games = summary.schedule_games_stored,
        boxscore_rows = summary.boxscore_rows_stored,
        failed_pages = summary.schedule_pages_failed + summary.boxscore_pages_failed,
        "Scrape complete"
    );

    Ok(summary)
}

/// Keep the seasons a run should visit, in index order.
///
/// Daily runs keep seasons whose end year is the target year or the one
/// after it, since a season straddles the new year.
pub fn select_seasons(
    seasons: Vec<Season>,
    mode: RunMode,
    target_date: Option<NaiveDate>,
    max_seasons: Option<usize>,
) -> Vec<Season> {
    let limit = max_seasons.unwrap_or(usize::MAX);
    match (mode, target_date) {
        (RunMode::Daily, Some(date)) => seasons
            .into_iter()
            .filter(|s| s.covers_date(date))
            .take(limit)
            .collect(),
        _ => seasons.into_iter().take(limit).collect(),
    }
}

async fn fetch_seasons(fetcher: &PageFetcher) -> Result<Vec<Season>> {
    let url = fetcher.season_index_url()?;
    let html = fetcher.fetch(url.as_str()).await?;
    let table = parse_season_index(&html)?;
    Ok(transform::seasons(&table, fetcher.base_url()))
}

async fn fetch_schedule(fetcher: &PageFetcher, season: &Season) -> Result<Vec<ScheduleGame>> {
    let url = season
        .schedule_url
        .as_deref()
        .ok_or_else(|| ParseError::NoScheduleLink {
            season_id: season.season_id.clone(),
        })?;
    let html = fetcher.fetch(url).await?;
    let table = parse_schedule(&html)?;
    Ok(transform::schedule_games(&table, season, fetcher.base_url()))
}

async fn fetch_boxscore(fetcher: &PageFetcher, url: &str) -> BoxscorePage {
    let load = async {
        let html = fetcher.fetch(url).await?;
        let tables = parse_boxscore(&html)?;
        Ok::<_, HoopsError>(tables)
    };
    load.await.map(Arc::new).map_err(Arc::new)
}
