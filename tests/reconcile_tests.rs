use rtimeclock::core::reconcile::{reconcile, reconcile_detailed, sleep_minutes};
use rtimeclock::errors::AppError;
use rtimeclock::models::event_kind::EventKind;
use rtimeclock::models::event_source::EventSource;
use rtimeclock::models::sleep_event::SleepEvent;

mod common;
use common::at;

fn sleep(h: u32, m: u32, s: u32) -> SleepEvent {
    SleepEvent::new(1, 1, EventKind::Sleep, at(h, m, s), EventSource::System)
}

fn resume(h: u32, m: u32, s: u32) -> SleepEvent {
    SleepEvent::new(1, 1, EventKind::Resume, at(h, m, s), EventSource::System)
}

#[test]
fn test_no_events_counts_full_span() {
    assert_eq!(reconcile(at(9, 0, 0), at(17, 0, 0), &[]).unwrap(), 480);
    // partial minute is floored
    assert_eq!(reconcile(at(9, 0, 0), at(9, 59, 59), &[]).unwrap(), 59);
}

#[test]
fn test_zero_length_session() {
    assert_eq!(reconcile(at(9, 0, 0), at(9, 0, 0), &[]).unwrap(), 0);
}

#[test]
fn test_single_sleep_resume_pair() {
    let events = vec![sleep(10, 0, 0), resume(10, 30, 0)];
    assert_eq!(reconcile(at(9, 0, 0), at(17, 0, 0), &events).unwrap(), 450);
}

#[test]
fn test_duplicate_sleep_keeps_first_anchor() {
    let events = vec![sleep(10, 0, 0), sleep(10, 5, 0), resume(10, 30, 0)];
    let rec = reconcile_detailed(at(9, 0, 0), at(17, 0, 0), &events).unwrap();

    assert_eq!(rec.total_minutes, 450);
    assert_eq!(rec.sleep_minutes, 30);
    assert_eq!(rec.duplicate_sleeps, 1);
    assert!(!rec.is_clean());
}

#[test]
fn test_trailing_sleep_is_not_counted() {
    let events = vec![sleep(16, 0, 0)];
    let rec = reconcile_detailed(at(9, 0, 0), at(17, 0, 0), &events).unwrap();

    assert_eq!(rec.total_minutes, 480);
    assert!(rec.trailing_sleep);
    assert_eq!(rec.pairs, 0);
}

#[test]
fn test_orphan_resume_is_ignored() {
    let events = vec![resume(9, 30, 0), sleep(12, 0, 0), resume(12, 45, 0)];
    let rec = reconcile_detailed(at(9, 0, 0), at(17, 0, 0), &events).unwrap();

    assert_eq!(rec.orphan_resumes, 1);
    assert_eq!(rec.sleep_minutes, 45);
    assert_eq!(rec.total_minutes, 435);
}

#[test]
fn test_unsorted_input_is_sorted_before_scan() {
    let events = vec![resume(10, 30, 0), resume(14, 10, 0), sleep(10, 0, 0), sleep(14, 0, 0)];
    assert_eq!(sleep_minutes(&events), 40);
    assert_eq!(reconcile(at(9, 0, 0), at(17, 0, 0), &events).unwrap(), 440);
}

#[test]
fn test_equal_timestamps_keep_input_order() {
    // resume first: orphan, then the sleep stays open
    let events = vec![resume(10, 0, 0), sleep(10, 0, 0)];
    let rec = reconcile_detailed(at(9, 0, 0), at(11, 0, 0), &events).unwrap();
    assert_eq!(rec.orphan_resumes, 1);
    assert!(rec.trailing_sleep);
    assert_eq!(rec.total_minutes, 120);

    // sleep first: a zero-length pair
    let events = vec![sleep(10, 0, 0), resume(10, 0, 0)];
    let rec = reconcile_detailed(at(9, 0, 0), at(11, 0, 0), &events).unwrap();
    assert_eq!(rec.pairs, 1);
    assert!(rec.is_clean());
    assert_eq!(rec.total_minutes, 120);
}

#[test]
fn test_each_pair_is_floored_separately() {
    // 89s + 89s: two pairs of one minute each, not one of 2m58s
    let events = vec![
        sleep(10, 0, 0),
        resume(10, 1, 29),
        sleep(11, 0, 0),
        resume(11, 1, 29),
    ];
    assert_eq!(sleep_minutes(&events), 2);
}

#[test]
fn test_sleep_outside_bounds_can_make_total_negative() {
    let events = vec![sleep(8, 0, 0), resume(12, 0, 0)];
    let rec = reconcile_detailed(at(9, 0, 0), at(10, 0, 0), &events).unwrap();
    assert_eq!(rec.total_minutes, -180);
}

#[test]
fn test_clock_out_before_clock_in_is_rejected() {
    let err = reconcile(at(17, 0, 0), at(9, 0, 0), &[]).unwrap_err();
    assert!(matches!(err, AppError::InvalidBounds { .. }));
}
