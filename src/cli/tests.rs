use super::*;

#[test]
fn test_defaults() {
    let args = Hoops::try_parse_from(["hoops-scrape"]).unwrap();
    assert_eq!(args.mode, RunMode::Full);
    assert_eq!(args.target_date, None);
    assert_eq!(args.max_seasons, None);
    assert!(!args.json);
    assert!(!args.verbose);
}

#[test]
fn test_daily_with_date() {
    let args = Hoops::try_parse_from([
        "hoops-scrape",
        "--mode",
        "daily",
        "--target-date",
        "2025-11-23",
        "--max-seasons",
        "2",
        "--json",
        "-v",
    ])
    .unwrap();
    assert_eq!(args.mode, RunMode::Daily);
    assert_eq!(args.target_date, NaiveDate::from_ymd_opt(2025, 11, 23));
    assert_eq!(args.max_seasons, Some(2));
    assert!(args.json);
    assert!(args.verbose);
}

#[test]
fn test_invalid_target_date_rejected() {
    let err = Hoops::try_parse_from(["hoops-scrape", "--target-date", "23/11/2025"]).unwrap_err();
    assert!(err.to_string().contains("Invalid date '23/11/2025'"));
}

#[test]
fn test_invalid_mode_rejected() {
    assert!(Hoops::try_parse_from(["hoops-scrape", "--mode", "weekly"]).is_err());
}

#[test]
fn test_parse_target_date() {
    assert_eq!(
        parse_target_date(" 2024-02-29 ").unwrap(),
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    );
    assert!(parse_target_date("2025-02-29").is_err());
}

#[test]
fn test_run_mode_display_and_serde() {
    assert_eq!(RunMode::Daily.to_string(), "daily");
    assert_eq!(serde_json::to_string(&RunMode::Full).unwrap(), "\"full\"");
}
