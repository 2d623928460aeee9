use crate::db::accounts;
use crate::db::feedback::{FeedbackFilter, load_feedback};
use crate::db::pool::DbPool;
use crate::db::store::FeedbackSink;
use crate::errors::AppResult;
use crate::models::feedback::{Feedback, Mood};

pub struct FeedbackLogic;

impl FeedbackLogic {
    /// Resolve the author and hand the entry to the sink.
    pub fn submit(
        pool: &DbPool,
        username: &str,
        mood: Mood,
        comment: &str,
        anonymous: bool,
    ) -> AppResult<i64> {
        let account = pool.with_conn(|conn| accounts::get_account(conn, username))?;
        pool.submit_feedback(account.id, mood, comment.trim(), anonymous)
    }

    pub fn list(pool: &DbPool, filter: &FeedbackFilter) -> AppResult<Vec<Feedback>> {
        pool.with_conn(|conn| load_feedback(conn, filter))
    }
}
