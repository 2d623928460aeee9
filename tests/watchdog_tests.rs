use chrono::TimeDelta;
use rtimeclock::core::reconcile::reconcile;
use rtimeclock::core::session::close_and_reconcile;
use rtimeclock::core::watchdog::{SessionWatchdog, WatchTarget, WatchdogConfig, WatchdogExit};
use rtimeclock::db::pool::DbPool;
use rtimeclock::db::store::SessionStore;
use rtimeclock::models::event_kind::EventKind;
use rtimeclock::models::event_source::EventSource;
use rtimeclock::models::session::CloseOutcome;
use rtimeclock::utils::time::now_local;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::memory_pool_with_account;

fn fast_config(max_minutes: i64) -> WatchdogConfig {
    WatchdogConfig {
        max_duration: TimeDelta::minutes(max_minutes),
        poll_interval: Duration::from_millis(10),
    }
}

fn target(pool: &DbPool, account_id: i64, session_id: i64) -> WatchTarget {
    WatchTarget {
        account_id,
        session_id,
        clock_in: pool.read_session(session_id).unwrap().clock_in,
    }
}

#[tokio::test]
async fn test_watchdog_closes_overdue_session() {
    let (pool, account_id) = memory_pool_with_account("alice");
    let clock_in = now_local() - TimeDelta::minutes(241);
    let sid = pool.open_session(account_id, clock_in).unwrap();
    pool.log_sleep_event(
        account_id,
        sid,
        EventKind::Sleep,
        EventSource::System,
        clock_in + TimeDelta::minutes(60),
    )
    .unwrap();
    pool.log_sleep_event(
        account_id,
        sid,
        EventKind::Resume,
        EventSource::System,
        clock_in + TimeDelta::minutes(90),
    )
    .unwrap();

    let pool = Arc::new(pool);
    let tgt = target(&pool, account_id, sid);
    let mut watchdog = SessionWatchdog::spawn(pool.clone(), tgt, fast_config(240));

    let exit = tokio::time::timeout(Duration::from_secs(5), watchdog.wait())
        .await
        .expect("watchdog did not fire");

    let WatchdogExit::TimedOut(CloseOutcome::Closed { total_minutes }) = exit.clone() else {
        panic!("unexpected exit: {exit:?}");
    };

    // same total as a manual clock-out at the persisted instant
    let closed = pool.read_session(sid).unwrap();
    let clock_out = closed.clock_out.expect("session closed");
    let events = pool.read_session_events(sid).unwrap();
    assert_eq!(closed.total_work_minutes, Some(total_minutes));
    assert_eq!(reconcile(clock_in, clock_out, &events).unwrap(), total_minutes);
    assert!(total_minutes >= 211);

    assert!(watchdog.is_finished());
    assert_eq!(watchdog.wait().await, exit);
}

#[tokio::test]
async fn test_cancelled_watchdog_leaves_session_open() {
    let (pool, account_id) = memory_pool_with_account("alice");
    let sid = pool.open_session(account_id, now_local()).unwrap();

    let pool = Arc::new(pool);
    let tgt = target(&pool, account_id, sid);
    let watchdog = SessionWatchdog::spawn(pool.clone(), tgt, fast_config(240));
    assert_eq!(watchdog.target().session_id, sid);

    tokio::time::sleep(Duration::from_millis(30)).await;
    let exit = watchdog.shutdown().await;

    assert_eq!(exit, WatchdogExit::Cancelled);
    assert!(pool.read_session(sid).unwrap().is_open());
}

#[tokio::test]
async fn test_cancellation_token_stops_watchdog() {
    let (pool, account_id) = memory_pool_with_account("alice");
    let sid = pool.open_session(account_id, now_local()).unwrap();

    let pool = Arc::new(pool);
    let tgt = target(&pool, account_id, sid);
    let mut watchdog = SessionWatchdog::spawn(pool.clone(), tgt, fast_config(240));

    watchdog.cancellation_token().cancel();
    let exit = tokio::time::timeout(Duration::from_secs(5), watchdog.wait())
        .await
        .expect("watchdog did not stop");
    assert_eq!(exit, WatchdogExit::Cancelled);
}

#[tokio::test]
async fn test_watchdog_after_manual_close_keeps_manual_values() {
    let (pool, account_id) = memory_pool_with_account("alice");
    let clock_in = now_local() - TimeDelta::minutes(300);
    let sid = pool.open_session(account_id, clock_in).unwrap();

    let manual_out = clock_in + TimeDelta::minutes(60);
    close_and_reconcile(&pool, sid, manual_out).unwrap();

    let pool = Arc::new(pool);
    let tgt = WatchTarget {
        account_id,
        session_id: sid,
        clock_in,
    };
    let mut watchdog = SessionWatchdog::spawn(pool.clone(), tgt, fast_config(240));
    let exit = tokio::time::timeout(Duration::from_secs(5), watchdog.wait())
        .await
        .expect("watchdog did not fire");

    assert_eq!(
        exit,
        WatchdogExit::TimedOut(CloseOutcome::AlreadyClosed {
            clock_out: manual_out,
            total_minutes: Some(60),
        })
    );
    assert_eq!(pool.read_session(sid).unwrap().clock_out, Some(manual_out));
}

#[tokio::test]
async fn test_watchdog_reports_failed_close() {
    let (pool, account_id) = memory_pool_with_account("alice");
    let pool = Arc::new(pool);
    let tgt = WatchTarget {
        account_id,
        session_id: 999,
        clock_in: now_local() - TimeDelta::minutes(500),
    };

    let mut watchdog = SessionWatchdog::spawn(pool, tgt, fast_config(240));
    let exit = tokio::time::timeout(Duration::from_secs(5), watchdog.wait())
        .await
        .expect("watchdog did not fire");

    assert!(matches!(exit, WatchdogExit::Failed(_)));
}
