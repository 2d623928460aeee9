use rtimeclock::core::account::AccountLogic;
use rtimeclock::core::feedback::FeedbackLogic;
use rtimeclock::db::feedback::FeedbackFilter;
use rtimeclock::db::pool::DbPool;
use rtimeclock::db::store::FeedbackSink;
use rtimeclock::errors::AppError;
use rtimeclock::models::account::Role;
use rtimeclock::models::feedback::Mood;
use rtimeclock::utils::date::{DateRange, today};

mod common;
use common::memory_pool_with_account;

#[test]
fn test_mood_codes_are_case_insensitive() {
    assert_eq!(Mood::from_code("great"), Some(Mood::Great));
    assert_eq!(Mood::from_code(" EXCELLENT "), Some(Mood::Excellent));
    assert_eq!(Mood::from_code("meh"), None);
}

#[test]
fn test_submit_and_list_feedback() {
    let (pool, account_id) = memory_pool_with_account("alice");

    let id = pool
        .submit_feedback(account_id, Mood::Good, "coffee machine works again", false)
        .unwrap();
    assert!(id > 0);
    FeedbackLogic::submit(&pool, "alice", Mood::Poor, "  too many meetings  ", true).unwrap();

    let all = FeedbackLogic::list(&pool, &FeedbackFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    // newest first
    assert_eq!(all[0].mood, Mood::Poor);
    assert_eq!(all[0].comment, "too many meetings");
    assert!(all[0].anonymous);
    assert_eq!(all[0].username, None);
    assert_eq!(all[1].username.as_deref(), Some("alice"));
}

#[test]
fn test_feedback_filters() {
    let (pool, _) = memory_pool_with_account("alice");
    AccountLogic::create(&pool, "bob", Role::Employee, true).unwrap();

    FeedbackLogic::submit(&pool, "alice", Mood::Great, "nice sprint", false).unwrap();
    FeedbackLogic::submit(&pool, "bob", Mood::Terrible, "build is broken", false).unwrap();
    FeedbackLogic::submit(&pool, "alice", Mood::Terrible, "printer", true).unwrap();

    let by_mood = FeedbackLogic::list(
        &pool,
        &FeedbackFilter {
            mood: Some(Mood::Terrible),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_mood.len(), 2);

    let by_comment = FeedbackLogic::list(
        &pool,
        &FeedbackFilter {
            keyword: Some("sprint".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_comment.len(), 1);

    // anonymous entries are not found by author name
    let by_user = FeedbackLogic::list(
        &pool,
        &FeedbackFilter {
            keyword: Some("alice".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_user.len(), 1);
    assert_eq!(by_user[0].comment, "nice sprint");

    let this_day = FeedbackLogic::list(
        &pool,
        &FeedbackFilter {
            range: Some(DateRange::single(today())),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(this_day.len(), 3);
}

#[test]
fn test_feedback_from_unknown_user_fails() {
    let pool = DbPool::in_memory().unwrap();
    let err = FeedbackLogic::submit(&pool, "ghost", Mood::Good, "", false).unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));
}
