//! Unit tests for the scrape command

use super::scrape::select_seasons;
use super::*;
use crate::cli::RunMode;
use crate::config::{ScraperConfig, TableNames};
use crate::core::PageFetcher;
use crate::models::{season_key, Season};
use crate::storage::{Store, TableKind};
use chrono::NaiveDate;
use reqwest::Url;
use std::path::Path;
use std::time::Duration;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

const SEASON_INDEX_HTML: &str = include_str!("../../tests/fixtures/season_index.html");
const BOXSCORE_HTML: &str = include_str!("../../tests/fixtures/boxscore.html");

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn season(league: &str, label: &str, year: i32) -> Season {
    Season {
        season_id: season_key(league, label),
        season: label.to_string(),
        season_url: Some(format!("/international/{}/{}.html", league, year)),
        league: league.to_string(),
        league_url: None,
        schedule_url: None,
    }
}

fn fetcher(server: &MockServer) -> PageFetcher {
    PageFetcher::new(&ScraperConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        request_delay: Duration::ZERO,
        max_retries: 2,
        backoff_factor: 2.0,
    })
    .unwrap()
}

fn memory_store() -> Store {
    Store::open_sqlite(Path::new(":memory:"), TableNames::default()).unwrap()
}

#[cfg(test)]
mod selection_tests {
    use super::*;

    fn seasons() -> Vec<Season> {
        vec![
            season("a", "2025-26", 2026),
            season("b", "2024-25", 2025),
            season("c", "2023-24", 2024),
        ]
    }

    #[test]
    fn test_full_keeps_all_seasons() {
        assert_eq!(select_seasons(seasons(), RunMode::Full, None, None).len(), 3);
    }

    #[test]
    fn test_full_respects_max_seasons() {
        let selected = select_seasons(seasons(), RunMode::Full, None, Some(2));
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].league, "a");
    }

    #[test]
    fn test_full_with_date_does_not_filter_seasons() {
        let selected = select_seasons(seasons(), RunMode::Full, Some(date(2025, 11, 23)), None);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_daily_keeps_covering_seasons() {
        let selected = select_seasons(seasons(), RunMode::Daily, Some(date(2025, 11, 23)), None);
        let leagues: Vec<_> = selected.iter().map(|s| s.league.as_str()).collect();
        assert_eq!(leagues, vec!["a", "b"]);
    }

    #[test]
    fn test_resolve_target_date() {
        let today = date(2026, 1, 15);
        let mut params = ScrapeParams::default();
        assert_eq!(params.resolve_target_date(today), None);

        params.target_date = Some(date(2025, 11, 23));
        assert_eq!(params.resolve_target_date(today), Some(date(2025, 11, 23)));

        params.mode = RunMode::Daily;
        assert_eq!(params.resolve_target_date(today), Some(date(2025, 11, 23)));

        params.target_date = None;
        assert_eq!(params.resolve_target_date(today), Some(today));
    }
}

#[cfg(test)]
mod run_tests {
    use super::*;

    const ONE_SEASON_INDEX: &str = r#"
        <table><thead><tr><th>Season</th><th>League</th></tr></thead><tbody>
        <tr><th><a href="/international/euroleague/2026.html">2025-26</a></th>
            <td><a href="/international/euroleague/">EuroLeague</a></td></tr>
        </tbody></table>"#;

    const SHARED_BOXSCORE_SCHEDULE: &str = r#"
        <table><thead><tr><th>Date</th><th>Team</th><th>PTS</th><th>Opp</th><th>PTS</th></tr></thead><tbody>
        <tr><th><a href="/international/boxscores/1.html">Sat, Nov 22, 2025</a></th>
            <td>Real Madrid</td><td>88</td><td>FC Barcelona</td><td>81</td></tr>
        <tr><th><a href="/international/boxscores/1.html">Sat, Nov 22, 2025</a></th>
            <td>Real Madrid</td><td>88</td><td>FC Barcelona</td><td>81</td></tr>
        <tr><th><a href="/international/boxscores/2.html">Sun, Nov 23, 2025</a></th>
            <td>Monaco</td><td>77</td><td>Partizan</td><td>74</td></tr>
        </tbody></table>"#;

    #[tokio::test]
    async fn test_season_index_failure_aborts_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/international/years/"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server)
            .await;

        let mut store = memory_store();
        let result = run_scrape(&fetcher(&server), &mut store, &ScrapeParams::default()).await;
        assert!(result.is_err());
        assert_eq!(store.row_count(TableKind::Seasons).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_season_index_without_table_aborts_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/international/years/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>maintenance</p>"))
            .mount(&server)
            .await;

        let mut store = memory_store();
        let err = run_scrape(&fetcher(&server), &mut store, &ScrapeParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::HoopsError::Parse(crate::error::ParseError::NoTable)
        ));
    }

    #[tokio::test]
    async fn test_shared_boxscore_page_fetched_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/international/years/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_SEASON_INDEX))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/international/euroleague/2026-schedule.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SHARED_BOXSCORE_SCHEDULE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/international/boxscores/1.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(BOXSCORE_HTML))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/international/boxscores/2.html"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = memory_store();
        let summary = run_scrape(&fetcher(&server), &mut store, &ScrapeParams::default())
            .await
            .unwrap();

        assert_eq!(summary.seasons_stored, 1);
        assert_eq!(summary.schedule_games_scraped, 3);
        // The duplicate listing shares its key with the first row.
        assert_eq!(summary.schedule_games_stored, 2);
        assert_eq!(summary.boxscore_pages_fetched, 2);
        assert_eq!(summary.boxscore_pages_failed, 1);
        assert_eq!(store.row_count(TableKind::Boxscores).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_shared_failing_page_counted_once() {
        let schedule = SHARED_BOXSCORE_SCHEDULE
            .replace("/international/boxscores/2.html", "/international/boxscores/1.html");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/international/years/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ONE_SEASON_INDEX))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/international/euroleague/2026-schedule.html"))
            .respond_with(ResponseTemplate::new(200).set_body_string(schedule))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/international/boxscores/1.html"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let mut store = memory_store();
        let summary = run_scrape(&fetcher(&server), &mut store, &ScrapeParams::default())
            .await
            .unwrap();

        assert_eq!(summary.boxscore_pages_fetched, 1);
        assert_eq!(summary.boxscore_pages_failed, 1);
        assert_eq!(summary.games_boxscore_failed, 3);
        assert_eq!(summary.boxscore_rows_stored, 0);
    }

    #[tokio::test]
    async fn test_missing_schedule_is_counted_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/international/years/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SEASON_INDEX_HTML))
            .mount(&server)
            .await;
        // No schedule mocks: every schedule page is a 404.

        let mut store = memory_store();
        let summary = run_scrape(&fetcher(&server), &mut store, &ScrapeParams::default())
            .await
            .unwrap();

        assert_eq!(summary.seasons_found, 3);
        assert_eq!(summary.seasons_stored, 3);
        assert_eq!(summary.schedule_pages_failed, 3);
        assert_eq!(summary.schedule_games_scraped, 0);
        assert_eq!(summary.boxscore_rows_stored, 0);
        assert!(!summary.used_fallback);
        assert_eq!(summary.storage_backend, "sqlite");
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            mode: RunMode::Daily,
            target_date: Some(date(2025, 11, 23)),
            storage_backend: "sqlite".to_string(),
            storage_location: "/tmp/hoops.db".to_string(),
            used_fallback: true,
            boxscore_rows_stored: 10,
            ..RunSummary::default()
        };
        let text = summary.to_string();
        assert!(text.starts_with("Mode: daily (2025-11-23)"));
        assert!(text.contains("Storage: sqlite at /tmp/hoops.db (fallback)"));
        assert!(text.contains("10 rows stored"));
    }
}
