use chrono::{NaiveDateTime, TimeDelta};
use rtimeclock::core::reconcile::{reconcile_detailed, sleep_minutes};
use rtimeclock::core::report::ReportLogic;
use rtimeclock::core::session::close_and_reconcile;
use rtimeclock::db::aggregate::{aggregate_sleep_minutes, bulk_report, bulk_report_for};
use rtimeclock::db::pool::DbPool;
use rtimeclock::db::store::SessionStore;
use rtimeclock::db::accounts::insert_account;
use rtimeclock::models::account::Role;
use rtimeclock::models::event_kind::EventKind;
use rtimeclock::models::event_source::EventSource;
use rtimeclock::utils::date::parse_period;

mod common;
use common::{at, memory_pool_with_account};

/// Open a session and log `events` in the given order.
fn log_stream(
    pool: &DbPool,
    account_id: i64,
    clock_in: NaiveDateTime,
    events: &[(EventKind, NaiveDateTime)],
) -> i64 {
    let session_id = pool.open_session(account_id, clock_in).unwrap();
    for (kind, t) in events {
        pool.log_sleep_event(account_id, session_id, *kind, EventSource::System, *t)
            .unwrap();
    }
    session_id
}

fn aggregate(pool: &DbPool, session_id: i64) -> i64 {
    pool.with_conn(|conn| aggregate_sleep_minutes(conn, session_id))
        .unwrap()
}

/// Timestamps for a stream of `n` events under a few layouts: strictly
/// increasing, pairwise ties, and reversed insertion.
fn layouts(base: NaiveDateTime, n: usize) -> Vec<Vec<NaiveDateTime>> {
    let increasing: Vec<_> = (0..n)
        .map(|i| base + TimeDelta::seconds(97 * i as i64))
        .collect();
    let ties: Vec<_> = (0..n)
        .map(|i| base + TimeDelta::seconds(61 * (i / 2) as i64))
        .collect();
    let reversed: Vec<_> = (0..n)
        .map(|i| base + TimeDelta::seconds(83 * (n - 1 - i) as i64))
        .collect();
    vec![increasing, ties, reversed]
}

#[test]
fn test_aggregate_matches_reducer_without_duplicate_sleeps() {
    let (pool, account_id) = memory_pool_with_account("alice");
    let clock_in = at(8, 0, 0);
    let clock_out = clock_in + TimeDelta::hours(12);

    let mut checked = 0;
    for n in 0..=8usize {
        for mask in 0u32..(1 << n) {
            let kinds: Vec<EventKind> = (0..n)
                .map(|i| {
                    if mask & (1 << i) != 0 {
                        EventKind::Sleep
                    } else {
                        EventKind::Resume
                    }
                })
                .collect();

            for times in layouts(at(9, 0, 0), n) {
                let stream: Vec<(EventKind, NaiveDateTime)> =
                    kinds.iter().copied().zip(times).collect();

                let session_id = log_stream(&pool, account_id, clock_in, &stream);
                let events = pool.read_session_events(session_id).unwrap();
                let rec = reconcile_detailed(clock_in, clock_out, &events).unwrap();

                if rec.duplicate_sleeps == 0 {
                    assert_eq!(
                        aggregate(&pool, session_id),
                        rec.sleep_minutes,
                        "stream {:?}",
                        stream
                    );
                    checked += 1;
                }

                close_and_reconcile(&pool, session_id, clock_out).unwrap();
            }
        }
    }

    assert!(checked >= 400, "only {} streams checked", checked);
}

#[test]
fn test_duplicate_sleep_pairs_differently_in_aggregate() {
    let (pool, account_id) = memory_pool_with_account("bob");
    let session_id = log_stream(
        &pool,
        account_id,
        at(9, 0, 0),
        &[
            (EventKind::Sleep, at(10, 0, 0)),
            (EventKind::Sleep, at(10, 5, 0)),
            (EventKind::Resume, at(10, 30, 0)),
        ],
    );

    let events = pool.read_session_events(session_id).unwrap();
    assert_eq!(sleep_minutes(&events), 30);
    // the aggregate anchors on the latest sleep before the resume
    assert_eq!(aggregate(&pool, session_id), 25);
}

#[test]
fn test_trailing_sleep_counts_zero_in_aggregate() {
    let (pool, account_id) = memory_pool_with_account("carol");
    let session_id = log_stream(
        &pool,
        account_id,
        at(9, 0, 0),
        &[
            (EventKind::Sleep, at(10, 0, 0)),
            (EventKind::Resume, at(10, 20, 30)),
            (EventKind::Sleep, at(16, 0, 0)),
        ],
    );

    assert_eq!(aggregate(&pool, session_id), 20);
}

#[test]
fn test_aggregate_is_idempotent_and_sees_new_events() {
    let (pool, account_id) = memory_pool_with_account("dave");
    let session_id = log_stream(
        &pool,
        account_id,
        at(9, 0, 0),
        &[
            (EventKind::Sleep, at(10, 0, 0)),
            (EventKind::Resume, at(10, 30, 0)),
        ],
    );

    let first = aggregate(&pool, session_id);
    let second = aggregate(&pool, session_id);
    assert_eq!(first, 30);
    assert_eq!(first, second);

    pool.log_sleep_event(account_id, session_id, EventKind::Sleep, EventSource::User, at(12, 0, 0))
        .unwrap();
    pool.log_sleep_event(account_id, session_id, EventKind::Resume, EventSource::User, at(12, 15, 0))
        .unwrap();
    assert_eq!(aggregate(&pool, session_id), 45);
}

#[test]
fn test_bulk_report_rows_and_range() {
    let (pool, account_id) = memory_pool_with_account("erin");

    let closed = log_stream(
        &pool,
        account_id,
        at(9, 0, 0),
        &[
            (EventKind::Sleep, at(10, 0, 0)),
            (EventKind::Resume, at(10, 30, 0)),
        ],
    );
    close_and_reconcile(&pool, closed, at(17, 0, 0)).unwrap();

    let next_day = at(9, 0, 0) + TimeDelta::days(1);
    let open = log_stream(&pool, account_id, next_day, &[]);

    let rows = pool.with_conn(|conn| bulk_report(conn, None)).unwrap();
    assert_eq!(rows.len(), 2);
    // newest first
    assert_eq!(rows[0].session_id, open);
    assert_eq!(rows[0].clock_out, None);
    assert_eq!(rows[0].total_work_minutes, 0);
    assert_eq!(rows[1].session_id, closed);
    assert_eq!(rows[1].username, "erin");
    assert_eq!(rows[1].sleep_minutes, 30);
    assert_eq!(rows[1].total_work_minutes, 450);

    let range = parse_period("2025-03-03").unwrap();
    let rows = pool
        .with_conn(|conn| bulk_report(conn, Some(&range)))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].session_id, closed);
}

#[test]
fn test_bulk_report_attaches_sleep_to_the_right_session() {
    let (pool, account_id) = memory_pool_with_account("frank");

    // event ids 1..=3 belong to the first session, so ids and session ids differ
    let first = log_stream(
        &pool,
        account_id,
        at(8, 0, 0),
        &[
            (EventKind::Resume, at(8, 10, 0)),
            (EventKind::Resume, at(8, 20, 0)),
            (EventKind::Resume, at(8, 30, 0)),
        ],
    );
    close_and_reconcile(&pool, first, at(9, 0, 0)).unwrap();

    let second = log_stream(
        &pool,
        account_id,
        at(10, 0, 0),
        &[
            (EventKind::Sleep, at(11, 0, 0)),
            (EventKind::Resume, at(11, 30, 0)),
        ],
    );
    close_and_reconcile(&pool, second, at(12, 0, 0)).unwrap();

    let rows = pool.with_conn(|conn| bulk_report(conn, None)).unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.sleep_minutes, aggregate(&pool, row.session_id));
    }

    let by_id = |id: i64| rows.iter().find(|r| r.session_id == id).unwrap();
    assert_eq!(by_id(first).sleep_minutes, 0);
    assert_eq!(by_id(second).sleep_minutes, 30);
    assert_eq!(by_id(second).total_work_minutes, 90);

    assert!(ReportLogic::verify_totals(&pool, None, None).unwrap().is_empty());
}

#[test]
fn test_events_after_clock_out_are_ignored_by_report_and_verify() {
    let (pool, account_id) = memory_pool_with_account("gina");
    let session_id = log_stream(&pool, account_id, at(9, 0, 0), &[]);
    close_and_reconcile(&pool, session_id, at(17, 0, 0)).unwrap();

    pool.log_sleep_event(account_id, session_id, EventKind::Sleep, EventSource::User, at(17, 5, 0))
        .unwrap();
    pool.log_sleep_event(account_id, session_id, EventKind::Resume, EventSource::User, at(17, 35, 0))
        .unwrap();

    assert_eq!(aggregate(&pool, session_id), 0);
    let rows = pool.with_conn(|conn| bulk_report(conn, None)).unwrap();
    assert_eq!(rows[0].sleep_minutes, 0);
    assert_eq!(rows[0].total_work_minutes, 480);

    assert!(ReportLogic::verify_totals(&pool, None, None).unwrap().is_empty());
}

#[test]
fn test_open_session_aggregate_counts_every_pair() {
    let (pool, account_id) = memory_pool_with_account("hank");
    let session_id = log_stream(
        &pool,
        account_id,
        at(9, 0, 0),
        &[
            (EventKind::Sleep, at(18, 0, 0)),
            (EventKind::Resume, at(18, 20, 0)),
        ],
    );

    assert_eq!(aggregate(&pool, session_id), 20);
}

#[test]
fn test_bulk_report_filters_by_username() {
    let (pool, alice) = memory_pool_with_account("alice");
    let bob = pool
        .with_conn(|conn| insert_account(conn, "bob", Role::Employee, true))
        .unwrap();
    let a = log_stream(&pool, alice, at(9, 0, 0), &[]);
    let b = log_stream(&pool, bob, at(9, 30, 0), &[]);

    let rows = pool
        .with_conn(|conn| bulk_report_for(conn, None, Some("ALI")))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].session_id, a);

    let range = parse_period("2025-03-03").unwrap();
    let rows = ReportLogic::rows(&pool, Some(&range), Some("bob")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].session_id, b);

    assert!(ReportLogic::rows(&pool, None, Some("nobody")).unwrap().is_empty());
}
