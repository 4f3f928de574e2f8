//! Waits for the deploy action of a preview to reach a terminal state.
//!
//! The wait is split into rounds, each a fresh bounded wait on the same
//! action. A round ends as soon as the action has succeeded, and the next
//! round confirms it again. A round that times out, a failed action, a
//! non-transient query error or cancellation ends the whole wait at once;
//! earlier successful rounds give no credit.

use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use okteto::PreviewApi;
use preview_core::{ActionHandle, ActionState};

use crate::error::{PreviewError, Result};

#[derive(Debug, Clone)]
pub struct ActionWaitConfig {
    pub rounds: u32,
    pub round_timeout: Duration,
    pub poll_interval: Duration,
    /// Caps the sum of all rounds. `None` means `rounds * round_timeout`.
    pub overall_timeout: Option<Duration>,
    /// Consecutive transient query failures tolerated before giving up.
    pub max_query_retries: u32,
}

impl Default for ActionWaitConfig {
    fn default() -> Self {
        Self {
            rounds: 4,
            round_timeout: Duration::from_secs(5 * 60),
            poll_interval: Duration::from_secs(2),
            overall_timeout: None,
            max_query_retries: 3,
        }
    }
}

impl ActionWaitConfig {
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds.max(1);
        self
    }

    pub fn with_round_timeout(mut self, timeout: Duration) -> Self {
        self.round_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = Some(timeout);
        self
    }

    pub fn with_max_query_retries(mut self, retries: u32) -> Self {
        self.max_query_retries = retries;
        self
    }

    pub fn total_timeout(&self) -> Duration {
        let by_rounds = self.round_timeout.saturating_mul(self.rounds.max(1));
        match self.overall_timeout {
            Some(overall) => overall.min(by_rounds),
            None => by_rounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundOutcome {
    Succeeded,
    TimedOut,
}

pub struct ActionWaiter<'a> {
    api: &'a dyn PreviewApi,
    config: ActionWaitConfig,
}

impl<'a> ActionWaiter<'a> {
    pub fn new(api: &'a dyn PreviewApi, config: ActionWaitConfig) -> Self {
        Self { api, config }
    }

    pub async fn wait(&self, handle: &ActionHandle, cancel: &CancellationToken) -> Result<()> {
        let started = Instant::now();
        let deadline = started + self.config.total_timeout();
        let rounds = self.config.rounds.max(1);

        for round in 1..=rounds {
            let round_deadline = (Instant::now() + self.config.round_timeout).min(deadline);

            info!(
                action = %handle.action_name,
                environment = %handle.environment,
                round = round,
                rounds = rounds,
                "Waiting for action to finish"
            );

            match self.wait_round(handle, round_deadline, cancel).await? {
                RoundOutcome::Succeeded => {
                    debug!(action = %handle.action_name, round = round, "Round finished");
                }
                RoundOutcome::TimedOut => {
                    warn!(
                        action = %handle.action_name,
                        round = round,
                        "Action still in progress at end of round"
                    );
                    return Err(PreviewError::ActionTimeout {
                        action: handle.action_name.clone(),
                        elapsed: started.elapsed(),
                    });
                }
            }
        }

        info!(
            action = %handle.action_name,
            elapsed = ?started.elapsed(),
            "Action finished"
        );
        Ok(())
    }

    async fn wait_round(
        &self,
        handle: &ActionHandle,
        round_deadline: Instant,
        cancel: &CancellationToken,
    ) -> Result<RoundOutcome> {
        let mut consecutive_failures = 0;

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PreviewError::Cancelled),
                _ = sleep_until(round_deadline) => return Ok(RoundOutcome::TimedOut),
                result = self.api.get_action_status(handle) => result,
            };

            match result {
                Ok(ActionState::Succeeded) => return Ok(RoundOutcome::Succeeded),
                Ok(ActionState::Failed) => {
                    return Err(PreviewError::ActionFailed {
                        action: handle.action_name.clone(),
                        environment: handle.environment.clone(),
                    });
                }
                Ok(state) => {
                    consecutive_failures = 0;
                    debug!(action = %handle.action_name, state = %state, "Action not finished");
                }
                Err(e) if e.is_transient() && consecutive_failures < self.config.max_query_retries => {
                    consecutive_failures += 1;
                    warn!(
                        action = %handle.action_name,
                        error = %e,
                        "Action status query failed, retrying (attempt {}/{})",
                        consecutive_failures,
                        self.config.max_query_retries
                    );
                }
                Err(e) => {
                    return Err(PreviewError::ActionQueryError {
                        action: handle.action_name.clone(),
                        source: e,
                    });
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(PreviewError::Cancelled),
                _ = sleep_until(round_deadline) => return Ok(RoundOutcome::TimedOut),
                _ = sleep(self.config.poll_interval) => {}
            }
        }
    }
}
