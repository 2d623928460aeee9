use rtimeclock::config::Config;
use rtimeclock::errors::AppError;
use rtimeclock::utils::date::parse_period;
use rtimeclock::utils::formatting::mins2readable;
use rtimeclock::utils::time::{floor_minutes, parse_ts};
use chrono::{NaiveDate, TimeDelta};

#[test]
fn test_partial_config_uses_defaults() {
    let cfg = Config::from_yaml("database: /tmp/custom.sqlite\n").unwrap();
    assert_eq!(cfg.database, "/tmp/custom.sqlite");
    assert_eq!(cfg.max_session_minutes, 240);
    assert_eq!(cfg.watchdog_poll_seconds, 60);
    assert_eq!(cfg.log_level, "warn");
    assert_eq!(cfg.max_session(), TimeDelta::minutes(240));
}

#[test]
fn test_invalid_config_values_are_rejected() {
    let err = Config::from_yaml("max_session_minutes: 0\n").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let err = Config::from_yaml("watchdog_poll_seconds: 0\n").unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let err = Config::from_yaml("max_session_minutes: [1, 2]\n").unwrap_err();
    assert!(matches!(err, AppError::ConfigParse(_)));
}

#[test]
fn test_missing_keys_are_listed() {
    let missing = Config::missing_keys("database: x\nlog_level: info\n").unwrap();
    assert_eq!(missing, vec!["max_session_minutes", "watchdog_poll_seconds"]);

    let cfg = Config::default();
    let yaml = serde_yaml::to_string(&cfg).unwrap();
    assert!(Config::missing_keys(&yaml).unwrap().is_empty());
}

#[test]
fn test_absolute_db_path_is_kept() {
    let p = Config::resolve_db_path("/var/tmp/x.sqlite");
    assert_eq!(p.to_string_lossy(), "/var/tmp/x.sqlite");
    assert!(Config::resolve_db_path("x.sqlite").starts_with(Config::config_dir()));
}

#[test]
fn test_period_expressions() {
    let d = |y, m, dd| NaiveDate::from_ymd_opt(y, m, dd).unwrap();

    let r = parse_period("2024-02").unwrap();
    assert_eq!((r.from, r.to), (d(2024, 2, 1), d(2024, 2, 29)));

    let r = parse_period("2025").unwrap();
    assert_eq!((r.from, r.to), (d(2025, 1, 1), d(2025, 12, 31)));

    let r = parse_period("2025-03-03").unwrap();
    assert_eq!(r.from, r.to);

    let r = parse_period("2024-09:2025-09").unwrap();
    assert_eq!((r.from, r.to), (d(2024, 9, 1), d(2025, 9, 30)));
    assert!(r.contains(d(2025, 1, 15)));

    assert!(matches!(
        parse_period("2025-09:2024-09"),
        Err(AppError::InvalidPeriod(_))
    ));
    assert!(parse_period("yesterday").is_err());
}

#[test]
fn test_minute_flooring_and_display() {
    assert_eq!(floor_minutes(TimeDelta::seconds(119)), 1);
    assert_eq!(floor_minutes(TimeDelta::seconds(-1)), -1);
    assert_eq!(floor_minutes(TimeDelta::milliseconds(-60_500)), -2);
    assert_eq!(mins2readable(450, false, false), "07h 30m");
    assert_eq!(mins2readable(-90, false, true), "-01:30");

    let ts = parse_ts("2025-03-03T09:00:00").unwrap();
    assert_eq!(ts, parse_ts("2025-03-03 09:00:00").unwrap());
    assert!(parse_ts("09:00").is_err());
}
