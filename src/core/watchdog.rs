//! Per-session timeout watchdog.
//!
//! One watchdog is spawned per clock-in. It polls the elapsed time since
//! clock-in and, once it exceeds the configured maximum, closes the session
//! through `close_and_reconcile` with "now" as clock-out, then stops. The
//! owner tears it down at clock-out through `cancel()` / `shutdown()`.
//!
//! A failed close is logged and ends the loop; there is no retry. Sessions
//! left open that way are picked up by `SessionLogic::sweep_stale`.

use crate::config::Config;
use crate::core::session::close_and_reconcile;
use crate::db::store::SessionStore;
use crate::models::session::CloseOutcome;
use crate::utils::time::now_local;
use chrono::{NaiveDateTime, TimeDelta};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct WatchdogConfig {
    /// Sessions open strictly longer than this are closed.
    pub max_duration: TimeDelta,
    pub poll_interval: Duration,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            max_duration: TimeDelta::minutes(240),
            poll_interval: Duration::from_secs(60),
        }
    }
}

impl From<&Config> for WatchdogConfig {
    fn from(cfg: &Config) -> Self {
        Self {
            max_duration: cfg.max_session(),
            poll_interval: cfg.poll_interval(),
        }
    }
}

/// The session a watchdog is responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTarget {
    pub account_id: i64,
    pub session_id: i64,
    pub clock_in: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchdogExit {
    /// Torn down by its owner before the deadline.
    Cancelled,
    /// Deadline passed; the close path ran.
    TimedOut(CloseOutcome),
    /// Deadline passed but the close failed.
    Failed(String),
}

/// Handle to a running watchdog task. Dropping it cancels the task.
pub struct SessionWatchdog {
    target: WatchTarget,
    cancel: CancellationToken,
    handle: Option<JoinHandle<WatchdogExit>>,
    exit: Option<WatchdogExit>,
}

impl SessionWatchdog {
    /// Spawn the watchdog on the current tokio runtime.
    pub fn spawn(
        store: Arc<dyn SessionStore>,
        target: WatchTarget,
        config: WatchdogConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        info!(
            session_id = target.session_id,
            max_minutes = config.max_duration.num_minutes(),
            poll_secs = config.poll_interval.as_secs(),
            "starting session watchdog"
        );

        let handle = tokio::spawn(watch_loop(store, target, config, task_cancel));

        Self {
            target,
            cancel,
            handle: Some(handle),
            exit: None,
        }
    }

    pub fn target(&self) -> &WatchTarget {
        &self.target
    }

    /// Token that stops the watchdog when cancelled; can be handed to the
    /// code that owns the session's lifetime.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.exit.is_some() || self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Wait for the task to end on its own. Cancel-safe: dropping the future
    /// leaves the watchdog running.
    pub async fn wait(&mut self) -> WatchdogExit {
        if let Some(exit) = &self.exit {
            return exit.clone();
        }

        let exit = match self.handle.as_mut() {
            Some(handle) => match handle.await {
                Ok(exit) => exit,
                Err(e) => WatchdogExit::Failed(format!("watchdog task aborted: {}", e)),
            },
            None => WatchdogExit::Cancelled,
        };

        self.handle = None;
        self.exit = Some(exit.clone());
        exit
    }

    /// Cancel and wait for the task to finish.
    pub async fn shutdown(mut self) -> WatchdogExit {
        self.cancel.cancel();
        self.wait().await
    }
}

impl Drop for SessionWatchdog {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn watch_loop(
    store: Arc<dyn SessionStore>,
    target: WatchTarget,
    config: WatchdogConfig,
    cancel: CancellationToken,
) -> WatchdogExit {
    loop {
        if cancel.is_cancelled() {
            debug!(session_id = target.session_id, "watchdog cancelled");
            return WatchdogExit::Cancelled;
        }

        let now = now_local();
        let elapsed = now - target.clock_in;

        if elapsed > config.max_duration {
            warn!(
                session_id = target.session_id,
                account_id = target.account_id,
                elapsed_minutes = elapsed.num_minutes(),
                "session exceeded maximum duration, closing"
            );
            return close_on_timeout(store, target, now).await;
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(session_id = target.session_id, "watchdog cancelled");
                return WatchdogExit::Cancelled;
            }
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }
}

async fn close_on_timeout(
    store: Arc<dyn SessionStore>,
    target: WatchTarget,
    now: NaiveDateTime,
) -> WatchdogExit {
    let session_id = target.session_id;
    let result =
        tokio::task::spawn_blocking(move || close_and_reconcile(store.as_ref(), session_id, now))
            .await;

    match result {
        Ok(Ok(outcome)) => {
            info!(session_id, ?outcome, "session closed by watchdog");
            WatchdogExit::TimedOut(outcome)
        }
        Ok(Err(e)) => {
            error!(session_id, error = %e, "watchdog failed to close session");
            WatchdogExit::Failed(e.to_string())
        }
        Err(e) => {
            error!(session_id, error = %e, "watchdog close task panicked");
            WatchdogExit::Failed(e.to_string())
        }
    }
}
