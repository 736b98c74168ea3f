//! Bounded state polling
//!
//! `StateChangeConf` waits for a remote object to move from a set of pending
//! states into a target state, re-reading it on a fixed interval.

use crate::context::Context;
use futures::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Outcome of one refresh: `None` when the object does not exist (yet),
/// otherwise the object and its current state string
pub type RefreshResult<T> = Result<Option<(T, String)>, String>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaitError {
    #[error("timeout while waiting for state to become {target:?} (last state: '{last_state}', timeout: {timeout:?})")]
    Timeout {
        target: Vec<String>,
        last_state: String,
        timeout: Duration,
    },

    #[error("unexpected state '{state}', wanted target {target:?}")]
    UnexpectedState { state: String, target: Vec<String> },

    #[error("error refreshing state: {0}")]
    Refresh(String),

    #[error("object not found after {checks} consecutive checks")]
    NotFound { checks: usize },

    #[error("wait cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct StateChangeConf {
    pub pending: Vec<String>,
    pub target: Vec<String>,
    /// Wait before the first refresh
    pub delay: Duration,
    /// Interval between refreshes
    pub min_timeout: Duration,
    pub timeout: Duration,
    /// Consecutive "not found" results tolerated before failing
    pub not_found_checks: usize,
}

impl Default for StateChangeConf {
    fn default() -> Self {
        Self {
            pending: vec![],
            target: vec![],
            delay: Duration::ZERO,
            min_timeout: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
            not_found_checks: 20,
        }
    }
}

impl StateChangeConf {
    /// Poll `refresh` until the object reaches a target state.
    ///
    /// Any state outside `pending` and `target` fails immediately.
    pub async fn wait_for_state<T>(
        &self,
        ctx: &Context,
        mut refresh: impl FnMut() -> BoxFuture<'static, RefreshResult<T>>,
    ) -> Result<T, WaitError> {
        let deadline = Instant::now() + self.timeout;
        let mut last_state = String::new();
        let mut not_found = 0usize;

        let mut wait = self.delay;
        loop {
            if !wait.is_zero() {
                let now = Instant::now();
                if now + wait > deadline {
                    wait = deadline.saturating_duration_since(now);
                }
                tokio::select! {
                    _ = sleep(wait) => {}
                    _ = ctx.cancelled() => return Err(WaitError::Cancelled),
                }
            }
            if ctx.is_cancelled() {
                return Err(WaitError::Cancelled);
            }

            match refresh().await.map_err(WaitError::Refresh)? {
                Some((object, state)) => {
                    not_found = 0;
                    debug!(state = %state, "refreshed object state");

                    if self.target.contains(&state) {
                        return Ok(object);
                    }
                    if !self.pending.contains(&state) {
                        return Err(WaitError::UnexpectedState {
                            state,
                            target: self.target.clone(),
                        });
                    }
                    last_state = state;
                }
                None => {
                    not_found += 1;
                    debug!(checks = not_found, "object not found while waiting");
                    if not_found > self.not_found_checks {
                        return Err(WaitError::NotFound { checks: not_found });
                    }
                }
            }

            if Instant::now() >= deadline {
                return Err(WaitError::Timeout {
                    target: self.target.clone(),
                    last_state,
                    timeout: self.timeout,
                });
            }
            wait = self.min_timeout;
        }
    }
}
